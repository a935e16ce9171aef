use ictl::compress::{self, Algorithm, Compression, Scratch};
use ictl::packet::{FrameType, Header, Packet};
use ictl::{BufferPool, Decoder, Encoder, EndpointConfig};
use proptest::prelude::*;

const MAX_PACKET: usize = 1379;
const MAX_PAYLOAD: usize = MAX_PACKET - 4;

fn compression() -> impl Strategy<Value = Compression> {
    prop_oneof![
        Just(Compression::Auto),
        Just(Compression::Fixed(Algorithm::None)),
        Just(Compression::Fixed(Algorithm::Flate)),
        Just(Compression::Fixed(Algorithm::Gzip)),
        Just(Compression::Fixed(Algorithm::Lzw)),
        Just(Compression::Fixed(Algorithm::Zlib)),
    ]
}

fn filled(pool: &BufferPool, data: &[u8]) -> ictl::Buffer {
    let mut buf = pool.acquire();
    buf.copy_from_slice(data).unwrap();
    buf
}

fn xor_vec(a: &[u8], b: &[u8]) -> Vec<u8> {
    let pool = BufferPool::new(4096);
    let mut out = pool.acquire();
    ictl::xor::xor(a, b, &mut out).unwrap();
    out.to_vec()
}

proptest! {
    #[test]
    fn prop_keyframe_roundtrip(
        payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD),
        compression in compression(),
    ) {
        let config = EndpointConfig::new()
            .with_cycle_length(1)
            .with_compression(compression);
        let pool = BufferPool::new(MAX_PACKET);
        let mut enc = Encoder::new(pool.clone(), &config).unwrap();
        let mut dec = Decoder::new(pool.clone(), &config, None).unwrap();

        let packet = match enc.encode(filled(&pool, &payload), 0) {
            Ok(packet) => packet,
            // A fixed codec may expand incompressible input past the packet size.
            Err(ictl::Error::Compression(_)) if compression != Compression::Auto => {
                return Ok(());
            }
            Err(e) => panic!("{e}"),
        };
        prop_assert_eq!(packet.frame_type(), FrameType::Keyframe);
        let decoded = dec.decode(packet.as_bytes()).unwrap();
        prop_assert_eq!(&decoded[..], &payload[..]);
    }

    #[test]
    fn prop_delta_roundtrip_against_keyframe_42(
        first in proptest::collection::vec(any::<u8>(), 0..512),
        second in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        prop_assume!(second.last() != Some(&0));
        let config = EndpointConfig::new();
        let pool = BufferPool::new(MAX_PACKET);
        let mut dec = Decoder::new(pool.clone(), &config, None).unwrap();

        let keyframe = Packet::assemble(
            &pool,
            Header::new(FrameType::Keyframe, Algorithm::None, 0, 42),
            &first,
        )
        .unwrap();
        dec.decode(keyframe.as_bytes()).unwrap();

        let diff = xor_vec(&first, &second);
        let mut scratch = Scratch::new();
        let best = compress::best_fit(&diff, 0, &mut scratch).unwrap();
        let delta = Packet::assemble(
            &pool,
            Header::new(FrameType::DeltaFrame, best.algorithm, best.options, 42),
            best.bytes,
        )
        .unwrap();

        let decoded = dec.decode(delta.as_bytes()).unwrap();
        prop_assert_eq!(&decoded[..], &second[..]);
    }

    #[test]
    fn prop_delta_drops_trailing_zero_bytes(
        first in proptest::collection::vec(any::<u8>(), 0..512),
        body in proptest::collection::vec(any::<u8>(), 0..512),
        zeros in 1usize..32,
    ) {
        let mut second = body.clone();
        second.resize(body.len() + zeros, 0);
        let config = EndpointConfig::new();
        let pool = BufferPool::new(MAX_PACKET);
        let mut dec = Decoder::new(pool.clone(), &config, None).unwrap();

        let keyframe = Packet::assemble(
            &pool,
            Header::new(FrameType::Keyframe, Algorithm::None, 0, 42),
            &first,
        )
        .unwrap();
        dec.decode(keyframe.as_bytes()).unwrap();

        let diff = xor_vec(&first, &second);
        let mut scratch = Scratch::new();
        let best = compress::best_fit(&diff, 0, &mut scratch).unwrap();
        let delta = Packet::assemble(
            &pool,
            Header::new(FrameType::DeltaFrame, best.algorithm, best.options, 42),
            best.bytes,
        )
        .unwrap();

        let trimmed = second.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let decoded = dec.decode(delta.as_bytes()).unwrap();
        prop_assert_eq!(&decoded[..], &second[..trimmed]);
        prop_assert!(decoded.len() < second.len());
    }

    #[test]
    fn prop_encoder_delta_roundtrip(
        first in proptest::collection::vec(any::<u8>(), 1..600),
        edits in proptest::collection::vec((any::<prop::sample::Index>(), 1u8..=255), 0..16),
        tail in proptest::collection::vec(1u8..=255, 0..32),
    ) {
        let mut second = first.clone();
        for (index, value) in edits {
            let i = index.index(second.len());
            second[i] ^= value;
        }
        second.extend_from_slice(&tail);
        prop_assume!(second.last() != Some(&0));

        let config = EndpointConfig::new();
        let pool = BufferPool::new(MAX_PACKET);
        let mut enc = Encoder::new(pool.clone(), &config).unwrap();
        let mut dec = Decoder::new(pool.clone(), &config, None).unwrap();

        let kf = enc.encode(filled(&pool, &first), 0).unwrap();
        prop_assert_eq!(&dec.decode(kf.as_bytes()).unwrap()[..], &first[..]);

        let df = enc.encode(filled(&pool, &second), 0).unwrap();
        prop_assert_eq!(df.frame_type(), FrameType::DeltaFrame);
        prop_assert_eq!(df.header().frame_id, 0);
        prop_assert_eq!(&dec.decode(df.as_bytes()).unwrap()[..], &second[..]);
    }

    #[test]
    fn prop_xor_with_self_is_empty(a in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert!(xor_vec(&a, &a).is_empty());
    }

    #[test]
    fn prop_xor_trims_to_last_difference(
        a in proptest::collection::vec(any::<u8>(), 1..1024),
        k in 1usize..64,
        masks in proptest::collection::vec(any::<u8>(), 64),
        forced in 1u8..=255,
    ) {
        let k = k.min(a.len());
        let start = a.len() - k;
        let mut b = a.clone();
        for (i, mask) in masks.iter().take(k).enumerate() {
            b[start + i] ^= mask;
        }
        // At least one difference inside the tail.
        b[start] = a[start] ^ forced;
        let expected = a
            .iter()
            .zip(&b)
            .rposition(|(x, y)| x != y)
            .map_or(0, |i| i + 1);
        let diff = xor_vec(&a, &b);
        prop_assert_eq!(diff.len(), expected);
        prop_assert!(expected > start);
    }

    #[test]
    fn prop_header_roundtrip(
        delta in any::<bool>(),
        algorithm in 0u8..=14,
        options in 0u8..=15,
        frame_id in any::<u16>(),
    ) {
        let frame_type = if delta { FrameType::DeltaFrame } else { FrameType::Keyframe };
        let header = Header { frame_type, algorithm, options, frame_id };
        let bytes = header.encode();
        prop_assert_eq!(bytes[0] >> 4, 0);
        prop_assert_eq!(Header::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn prop_best_fit_never_loses_to_a_single_codec(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
    ) {
        let mut scratch = Scratch::new();
        let best = compress::best_fit(&data, 0, &mut scratch).unwrap().bytes.len();
        for algorithm in Algorithm::ALL {
            let mut other = Scratch::new();
            let single = compress::compress_with(algorithm, &data, 0, &mut other).unwrap();
            prop_assert!(best <= single.bytes.len(), "{} beat best fit", algorithm);
        }
    }
}
