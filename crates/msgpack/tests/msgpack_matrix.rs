use std::sync::Arc;

use bytepack_msgpack::{
    decode, decode_at, decode_many, encode, encode_many, DecodeError, Ext, ExtensionDescriptor,
    ExtensionRegistry, MsgPackDecoder, MsgPackEncoder, RegistryError, Value,
};

fn map(pairs: &[(&str, Value)]) -> Value {
    Value::Map(
        pairs
            .iter()
            .map(|(k, v)| (Value::Str((*k).to_owned()), v.clone()))
            .collect(),
    )
}

fn bin_identity(id: i8) -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        id,
        |val| match val {
            Value::Bin(bytes) => bytes.clone(),
            _ => Vec::new(),
        },
        |payload, id| Value::Ext(Ext::new(id, Value::Bin(payload.to_vec()))),
    )
}

#[test]
fn integer_wire_matrix() {
    let cases: &[(i64, &[u8])] = &[
        (0, &[0x00]),
        (1, &[0x01]),
        (127, &[0x7f]),
        (128, &[0xcc, 0x80]),
        (255, &[0xcc, 0xff]),
        (256, &[0xcd, 0x01, 0x00]),
        (65535, &[0xcd, 0xff, 0xff]),
        (65536, &[0xce, 0x00, 0x01, 0x00, 0x00]),
        (4294967295, &[0xce, 0xff, 0xff, 0xff, 0xff]),
        (4294967296, &[0xcf, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]),
        (-1, &[0xff]),
        (-32, &[0xe0]),
        (-33, &[0xd0, 0xdf]),
        (-128, &[0xd0, 0x80]),
        (-129, &[0xd1, 0xff, 0x7f]),
        (-32768, &[0xd1, 0x80, 0x00]),
        (-32769, &[0xd2, 0xff, 0xff, 0x7f, 0xff]),
        (-2147483648, &[0xd2, 0x80, 0x00, 0x00, 0x00]),
        (
            -2147483649,
            &[0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff],
        ),
        (
            i64::MIN,
            &[0xd3, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ),
    ];
    for (n, expected) in cases {
        let bytes = encode(&Value::Int(*n)).unwrap();
        assert_eq!(&bytes, expected, "wire bytes for {n}");
        let (decoded, consumed) = decode(&bytes).unwrap();
        assert_eq!(decoded, Value::Int(*n), "roundtrip for {n}");
        assert_eq!(consumed, bytes.len());
    }

    let bytes = encode(&Value::UInt(u64::MAX)).unwrap();
    assert_eq!(
        bytes,
        [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(decode(&bytes).unwrap().0, Value::UInt(u64::MAX));
}

#[test]
fn float_wire_matrix() {
    // 1.5 survives f32 narrowing
    let bytes = encode(&Value::Float(1.5)).unwrap();
    assert_eq!(bytes, [0xca, 0x3f, 0xc0, 0x00, 0x00]);

    // 0.1 does not
    let bytes = encode(&Value::Float(0.1)).unwrap();
    assert_eq!(bytes[0], 0xcb);
    assert_eq!(f64::from_be_bytes(bytes[1..].try_into().unwrap()), 0.1);

    // NaN never narrows
    let bytes = encode(&Value::Float(f64::NAN)).unwrap();
    assert_eq!(bytes[0], 0xcb);
    let (decoded, _) = decode(&bytes).unwrap();
    let Value::Float(f) = decoded else {
        panic!("expected float");
    };
    assert!(f.is_nan());
}

#[test]
fn string_header_matrix() {
    let cases: &[(usize, &[u8])] = &[
        (0, &[0xa0]),
        (31, &[0xbf]),
        (32, &[0xd9, 32]),
        (255, &[0xd9, 255]),
        (256, &[0xda, 0x01, 0x00]),
        (65535, &[0xda, 0xff, 0xff]),
        (65536, &[0xdb, 0x00, 0x01, 0x00, 0x00]),
    ];
    for (len, header) in cases {
        let value = Value::Str("x".repeat(*len));
        let bytes = encode(&value).unwrap();
        assert_eq!(&bytes[..header.len()], *header, "header for len {len}");
        assert_eq!(bytes.len(), header.len() + len);
        assert_eq!(decode(&bytes).unwrap().0, value);
    }
}

#[test]
fn binary_header_matrix() {
    let cases: &[(usize, &[u8])] = &[
        (0, &[0xc4, 0]),
        (255, &[0xc4, 255]),
        (256, &[0xc5, 0x01, 0x00]),
        (65536, &[0xc6, 0x00, 0x01, 0x00, 0x00]),
    ];
    for (len, header) in cases {
        let value = Value::Bin(vec![0xab; *len]);
        let bytes = encode(&value).unwrap();
        assert_eq!(&bytes[..header.len()], *header, "header for len {len}");
        assert_eq!(decode(&bytes).unwrap().0, value);
    }
}

#[test]
fn container_header_matrix() {
    let arr = |n: usize| Value::Array(vec![Value::Nil; n]);
    assert_eq!(encode(&arr(0)).unwrap(), [0x90]);
    assert_eq!(encode(&arr(15)).unwrap()[0], 0x9f);
    assert_eq!(&encode(&arr(16)).unwrap()[..3], &[0xdc, 0x00, 0x10]);
    assert_eq!(&encode(&arr(65535)).unwrap()[..3], &[0xdc, 0xff, 0xff]);
    assert_eq!(
        &encode(&arr(65536)).unwrap()[..5],
        &[0xdd, 0x00, 0x01, 0x00, 0x00]
    );

    let mp = |n: i64| Value::Map((0..n).map(|i| (Value::Int(i), Value::Nil)).collect());
    assert_eq!(encode(&mp(0)).unwrap(), [0x80]);
    assert_eq!(encode(&mp(15)).unwrap()[0], 0x8f);
    assert_eq!(&encode(&mp(16)).unwrap()[..3], &[0xde, 0x00, 0x10]);
}

#[test]
fn empty_array_and_map_stay_distinct() {
    let (decoded, _) = decode(&encode(&Value::Array(Vec::new())).unwrap()).unwrap();
    assert!(matches!(decoded, Value::Array(ref v) if v.is_empty()));
    let (decoded, _) = decode(&encode(&Value::Map(Vec::new())).unwrap()).unwrap();
    assert!(matches!(decoded, Value::Map(ref v) if v.is_empty()));
}

#[test]
fn nested_document_roundtrip() {
    let doc = map(&[
        ("title", Value::Str("bytepack".into())),
        ("version", Value::Int(3)),
        ("ratio", Value::Float(0.25)),
        (
            "tags",
            Value::Array(vec![Value::Str("codec".into()), Value::Str("wire".into())]),
        ),
        (
            "meta",
            map(&[
                ("checksum", Value::Bin(vec![0xde, 0xad, 0xbe, 0xef])),
                ("published", Value::Bool(true)),
                ("parent", Value::Nil),
            ]),
        ),
    ]);
    let bytes = encode(&doc).unwrap();
    let (decoded, consumed) = decode(&bytes).unwrap();
    assert_eq!(decoded, doc);
    assert_eq!(consumed, bytes.len());
}

#[test]
fn extension_width_ladder() {
    let registry = Arc::new(ExtensionRegistry::new());
    registry.register(bin_identity(-1)).unwrap();
    let mut encoder = MsgPackEncoder::with_registry(Arc::clone(&registry));
    let decoder = MsgPackDecoder::with_registry(Arc::clone(&registry));

    let cases: &[(usize, &[u8])] = &[
        (1, &[0xd4, 0xff]),
        (2, &[0xd5, 0xff]),
        (4, &[0xd6, 0xff]),
        (8, &[0xd7, 0xff]),
        (16, &[0xd8, 0xff]),
        (0, &[0xc7, 0x00, 0xff]),
        (3, &[0xc7, 0x03, 0xff]),
        (17, &[0xc7, 0x11, 0xff]),
        (255, &[0xc7, 0xff, 0xff]),
        (256, &[0xc8, 0x01, 0x00, 0xff]),
        (65536, &[0xc9, 0x00, 0x01, 0x00, 0x00, 0xff]),
    ];
    for (len, header) in cases {
        let value = Value::Ext(Ext::new(-1, Value::Bin(vec![0x5a; *len])));
        let bytes = encoder.encode(&value).unwrap();
        assert_eq!(&bytes[..header.len()], *header, "header for payload {len}");
        assert_eq!(bytes.len(), header.len() + len);
        let (decoded, consumed) = decoder.decode(&bytes).unwrap();
        assert_eq!(decoded, value, "roundtrip for payload {len}");
        assert_eq!(consumed, bytes.len());
    }
}

#[test]
fn registry_flow_errors() {
    let registry = ExtensionRegistry::new();
    registry.register(bin_identity(1)).unwrap();
    assert_eq!(
        registry.register(bin_identity(1)),
        Err(RegistryError::DuplicateId(1))
    );
    assert_eq!(
        registry.unregister(2).unwrap_err(),
        RegistryError::UnknownId(2)
    );
    registry.unregister(1).unwrap();
    assert!(registry.get(1).is_none());
}

#[test]
fn unregister_breaks_decode() {
    let registry = Arc::new(ExtensionRegistry::new());
    registry.register(bin_identity(4)).unwrap();
    let mut encoder = MsgPackEncoder::with_registry(Arc::clone(&registry));
    let decoder = MsgPackDecoder::with_registry(Arc::clone(&registry));

    let value = Value::Ext(Ext::new(4, Value::Bin(vec![1, 2])));
    let bytes = encoder.encode(&value).unwrap();
    registry.unregister(4).unwrap();
    assert_eq!(decoder.decode(&bytes), Err(DecodeError::UnknownExtension(4)));
}

#[test]
fn truncation_grid() {
    let cases: &[&[u8]] = &[
        &[0xcc],                   // uint8 missing operand
        &[0xcd, 0x01],             // uint16 operand cut short
        &[0xce, 0x01, 0x02, 0x03], // uint32 operand cut short
        &[0xcf, 0x01],             // uint64 operand cut short
        &[0xd0],                   // int8 missing operand
        &[0xd3, 0x00, 0x00],       // int64 operand cut short
        &[0xca, 0x3f, 0xc0],       // float32 cut short
        &[0xcb, 0x3f],             // float64 cut short
        &[0xd9],                   // str8 missing length
        &[0xd9, 0x05, b'h'],       // str8 payload cut short
        &[0xda, 0x00],             // str16 length cut short
        &[0xdb, 0x00, 0x00, 0x00], // str32 length cut short
        &[0xc4, 0x02, 0xaa],       // bin8 payload cut short
        &[0xc5, 0x00],             // bin16 length cut short
        &[0xc7, 0x02, 0x01, 0xaa], // ext8 payload cut short
        &[0xd6, 0x01, 0xaa],       // fixext4 payload cut short
        &[0xdc, 0x00],             // array16 count cut short
        &[0xdc, 0x00, 0x02, 0x01], // array16 missing an element
        &[0xde, 0x00, 0x01, 0xa1, b'k'], // map16 missing a value
        &[0x91],                   // fixarray missing its element
        &[0x81, 0x01],             // fixmap missing the value
        &[0xa3, b'a'],             // fixstr payload cut short
    ];
    for bytes in cases {
        assert_eq!(
            decode(bytes),
            Err(DecodeError::UnexpectedEof),
            "expected truncation failure for {bytes:02x?}"
        );
    }
}

#[test]
fn adversarial_length_fields_do_not_overread() {
    // str16 claiming 65535 bytes with a 2-byte payload
    assert_eq!(
        decode(&[0xda, 0xff, 0xff, b'h', b'i']),
        Err(DecodeError::UnexpectedEof)
    );
    // bin32 claiming 4 GiB
    assert_eq!(
        decode(&[0xc6, 0xff, 0xff, 0xff, 0xff, 0x00]),
        Err(DecodeError::UnexpectedEof)
    );
    // array32 claiming 2^32 - 1 elements
    assert_eq!(
        decode(&[0xdd, 0xff, 0xff, 0xff, 0xff, 0xc0]),
        Err(DecodeError::UnexpectedEof)
    );
}

#[test]
fn decode_many_concatenated_stream() {
    let values = vec![
        Value::Int(-7),
        Value::Str("stream".into()),
        Value::Array(vec![Value::Bool(false), Value::Nil]),
        Value::Float(2.5),
    ];
    let bytes = encode_many(&values).unwrap();
    assert_eq!(decode_many(&bytes).unwrap(), values);
}

#[test]
fn decode_at_walks_a_stream() {
    let values = vec![Value::Int(10), Value::Int(20), Value::Int(30)];
    let bytes = encode_many(&values).unwrap();
    let mut position = 0;
    let mut collected = Vec::new();
    while position < bytes.len() {
        let (value, next) = decode_at(&bytes, position).unwrap();
        collected.push(value);
        position = next;
    }
    assert_eq!(collected, values);

    // a start position past the end is a bounds failure, not a panic
    assert_eq!(
        decode_at(&bytes, bytes.len() + 1),
        Err(DecodeError::UnexpectedEof)
    );
}
