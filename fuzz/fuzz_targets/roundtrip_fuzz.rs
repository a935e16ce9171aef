#![no_main]
use libfuzzer_sys::fuzz_target;
use ictl::packet::FrameType;
use ictl::{Endpoint, EndpointConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte: cadence (0 = adaptive). Rest: frames separated by 0xFF.
    let cycle_length = u32::from(data[0] % 6);
    let config = EndpointConfig::new().with_cycle_length(cycle_length);
    let sender = Endpoint::new(config.clone()).unwrap();
    let receiver = Endpoint::new(config).unwrap();

    let max_payload = sender.config().max_payload_size();
    for (i, frame) in data[1..].split(|&b| b == 0xFF).enumerate() {
        let frame = &frame[..frame.len().min(max_payload)];
        let packet = sender.encode("fuzz", frame, i as u8).unwrap();
        let decoded = receiver.decode("fuzz", packet.as_bytes()).unwrap();
        match packet.frame_type() {
            FrameType::Keyframe => assert_eq!(&decoded[..], frame),
            FrameType::DeltaFrame => {
                let end = frame.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                assert_eq!(&decoded[..], &frame[..end]);
            }
        }
    }
});
