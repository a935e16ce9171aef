#![no_main]
use libfuzzer_sys::fuzz_target;
use ictl::{Endpoint, EndpointConfig};

fuzz_target!(|data: &[u8]| {
    // Arbitrary packets must only ever produce errors, never panics.
    let endpoint = Endpoint::new(EndpointConfig::default()).unwrap();
    let _ = endpoint.decode("fuzz", data);

    // Split into a keyframe and a follow-up frame on the same stream.
    if data.len() >= 8 {
        let (first, second) = data.split_at(data.len() / 2);
        let _ = endpoint.decode("pair", first);
        let _ = endpoint.decode("pair", second);
    }
});
