#![no_main]

use {libfuzzer_sys::fuzz_target, rlc_am::status::StatusPdu};

fuzz_target!(|pdu: StatusPdu| {
    let bytes = pdu.encode().unwrap();
    assert_eq!(pdu.encode_len(), bytes.len());

    let (decoded, len) = StatusPdu::decode(&bytes).unwrap();
    assert_eq!(bytes.len(), len);
    assert_eq!(pdu, decoded);
});
