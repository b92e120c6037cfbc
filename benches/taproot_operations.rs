use blvm_taproot::control_block::{decode, ControlBlock};
use blvm_taproot::crypto::tagged_hash;
use blvm_taproot::predicate::hash_lock_script;
use blvm_taproot::tree::{compute_merkle_root, compute_proof, ScriptTree};
use blvm_taproot::tweak::{compute_output_key, internal_key_from_secret};
use blvm_taproot::types::ScriptLeaf;
use blvm_taproot::verifier::verify_spend;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn tree_of(leaves: usize) -> ScriptTree {
    let leaves = (0..leaves)
        .map(|i| ScriptLeaf::tapscript(hash_lock_script(&(i as u64).to_le_bytes())))
        .collect();
    ScriptTree::balanced(leaves).unwrap()
}

fn benchmark_tagged_hash(c: &mut Criterion) {
    let data = vec![0u8; 64];

    c.bench_function("tagged_hash_tapbranch_64b", |b| {
        b.iter(|| black_box(tagged_hash("TapBranch", black_box(&data))))
    });
}

fn benchmark_merkle(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle");
    for leaves in [1usize, 8, 64, 512] {
        let tree = tree_of(leaves);
        group.bench_with_input(BenchmarkId::new("root", leaves), &tree, |b, tree| {
            b.iter(|| black_box(compute_merkle_root(black_box(tree))))
        });
        group.bench_with_input(BenchmarkId::new("proof", leaves), &tree, |b, tree| {
            b.iter(|| black_box(compute_proof(black_box(tree), leaves - 1)))
        });
    }
    group.finish();
}

fn benchmark_output_key(c: &mut Criterion) {
    let internal = internal_key_from_secret(&[7u8; 32]).unwrap();
    let root = [0x42u8; 32];

    c.bench_function("compute_output_key", |b| {
        b.iter(|| black_box(compute_output_key(black_box(&internal), Some(black_box(&root)))))
    });
}

fn benchmark_control_block(c: &mut Criterion) {
    let internal = internal_key_from_secret(&[7u8; 32]).unwrap();
    let tree = tree_of(64);
    let root = compute_merkle_root(&tree);
    let output = compute_output_key(&internal, Some(&root)).unwrap();
    let cb = ControlBlock::derive(&internal, &tree, 17).unwrap();
    let bytes = cb.encode();
    let script = hash_lock_script(&17u64.to_le_bytes());

    c.bench_function("control_block_decode_depth6", |b| {
        b.iter(|| black_box(decode(black_box(&bytes))))
    });

    c.bench_function("control_block_verify_depth6", |b| {
        b.iter(|| black_box(cb.verify(black_box(&script), &output.output_pubkey, output.parity)))
    });

    let witness = vec![17u64.to_le_bytes().to_vec(), script.clone(), bytes.clone()];
    c.bench_function("verify_spend_hash_lock_depth6", |b| {
        b.iter(|| black_box(verify_spend(&output.output_pubkey, black_box(&witness))))
    });
}

criterion_group!(
    benches,
    benchmark_tagged_hash,
    benchmark_merkle,
    benchmark_output_key,
    benchmark_control_block
);

criterion_main!(benches);
