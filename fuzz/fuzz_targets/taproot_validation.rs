#![no_main]
use blvm_taproot::commitment::{extract_taproot_output_key, validate_taproot_script};
use blvm_taproot::control_block::decode;
use blvm_taproot::tree::compute_root_from_proof;
use blvm_taproot::tweak::{compute_output_key, verify_output_key};
use blvm_taproot::types::Parity;
use blvm_taproot::verifier::verify_spend;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Control block decode, verification and the full script-path verifier
    // on arbitrary bytes. None of these may panic.

    if data.is_empty() {
        return;
    }

    // Test 1: P2TR script recognition
    if data.len() >= 34 {
        let script = &data[..34];
        if validate_taproot_script(script) {
            assert!(extract_taproot_output_key(script).is_some());
        }
    }

    // Test 2: key tweaking on arbitrary keys and roots
    if data.len() >= 64 {
        let internal: [u8; 32] = data[0..32].try_into().unwrap_or([0; 32]);
        let root: [u8; 32] = data[32..64].try_into().unwrap_or([0; 32]);
        if let Ok(tweaked) = compute_output_key(&internal, Some(&root)) {
            assert_eq!(
                verify_output_key(&internal, Some(&root), &tweaked.output_pubkey, tweaked.parity),
                Ok(true)
            );
        }
    }

    // Test 3: control block round trip and verification
    let split = (data[0] as usize).min(data.len() - 1);
    let (script, rest) = data[1..].split_at(split);
    if let Ok(cb) = decode(rest) {
        assert_eq!(cb.encode(), rest);
        let root = compute_root_from_proof(
            blvm_taproot::tree::tap_leaf_hash(cb.leaf_version, script),
            &cb.merkle_proof,
        );
        assert_eq!(root, cb.merkle_root(script));
        if let Ok(tweaked) = compute_output_key(&cb.internal_pubkey, Some(&root)) {
            assert_eq!(
                cb.verify(script, &tweaked.output_pubkey, tweaked.parity),
                cb.output_parity == tweaked.parity
            );
        }
        let _ = cb.verify(script, &[0u8; 32], Parity::Even);
    }

    // Test 4: full verifier on a witness carved from the input
    let witness: Vec<Vec<u8>> = rest.chunks(40).map(|c| c.to_vec()).collect();
    let output_key: [u8; 32] = data.get(..32).and_then(|k| k.try_into().ok()).unwrap_or([0; 32]);
    let _ = verify_spend(&output_key, &witness);
});
