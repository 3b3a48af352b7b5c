#![no_main]

use {libfuzzer_sys::fuzz_target, rlc_am::status::StatusPdu};

fuzz_target!(|input: &[u8]| {
    let Ok((pdu, len)) = StatusPdu::decode(input) else {
        return;
    };
    assert!(len <= input.len());

    // padding bits in `input` may be non-zero, so only compare the decoded form
    let bytes = pdu.encode().unwrap();
    assert_eq!(len, bytes.len());
    assert_eq!(pdu, StatusPdu::decode(&bytes).unwrap().0);
});
