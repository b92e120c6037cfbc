#![no_main]
use blvm_taproot::witness::{split_script_path, WitnessStack};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Serialized witness parsing must never panic, and anything it accepts
    // must serialize back to the same bytes.
    if let Ok(witness) = WitnessStack::deserialize(data) {
        assert_eq!(witness.serialize(), data);

        if let Ok(parts) = split_script_path(witness.as_slice()) {
            assert_eq!(parts.script_inputs.len() + 2, witness.len());
        } else {
            assert!(witness.len() < 2);
        }
    }
});
