//! Conversion between subtree state and cookie values.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use jarsync_types::{StateTree, SubtreeDescriptor};

use crate::error::{CookieError, CookieResult};

/// Characters `encodeURIComponent` leaves alone; everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const COMPRESSION_LEVEL: i32 = 3;

/// Upper bound for a decompressed cookie value. Cookies are attacker
/// controlled; a frame claiming more than this is rejected.
pub const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024;

/// Encode subtree state into a cookie-safe string according to `descriptor`.
pub fn encode(state: &StateTree, descriptor: &SubtreeDescriptor) -> CookieResult<String> {
    let encode_error = |reason: String| CookieError::Encode {
        name: descriptor.cookie_name.clone(),
        reason,
    };

    let serialized = match &descriptor.serialize {
        Some(serialize) => serialize.call(state).map_err(|e| encode_error(e.to_string()))?,
        None => serde_json::to_string(state).map_err(|e| encode_error(e.to_string()))?,
    };

    if descriptor.compress {
        let compressed = zstd::encode_all(serialized.as_bytes(), COMPRESSION_LEVEL)
            .map_err(|e| encode_error(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(compressed))
    } else {
        Ok(utf8_percent_encode(&serialized, URI_COMPONENT).to_string())
    }
}

/// Decode a cookie value produced by [`encode`] with the same descriptor.
pub fn decode(raw: &str, descriptor: &SubtreeDescriptor) -> CookieResult<StateTree> {
    let decode_error = |reason: String| CookieError::Decode {
        name: descriptor.cookie_name.clone(),
        reason,
    };

    let serialized = if descriptor.compress {
        let compressed = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| decode_error(e.to_string()))?;
        let bytes = zstd::bulk::decompress(&compressed, MAX_DECOMPRESSED_SIZE)
            .map_err(|e| decode_error(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?
    } else {
        percent_decode_str(raw)
            .decode_utf8()
            .map_err(|e| decode_error(e.to_string()))?
            .into_owned()
    };

    match &descriptor.deserialize {
        Some(deserialize) => deserialize
            .call(&serialized)
            .map_err(|e| decode_error(e.to_string())),
        None => serde_json::from_str(&serialized).map_err(|e| decode_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarsync_types::{CodecError, DeserializeFn, SerializeFn, StatePath};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    use crate::header::is_valid_cookie_value;

    fn descriptor(compress: bool) -> SubtreeDescriptor {
        SubtreeDescriptor::new(StatePath::parse("subtree").unwrap()).with_compress(compress)
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(Value::from),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{0,4}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    // -----------------------------------------------------------------------
    // Encoding shape
    // -----------------------------------------------------------------------

    #[test]
    fn uncompressed_matches_uri_component_encoding() {
        let state = StateTree::from(json!({"my": "state it's (ok)"}));
        let encoded = encode(&state, &descriptor(false)).unwrap();
        assert_eq!(encoded, "%7B%22my%22%3A%22state%20it's%20(ok)%22%7D");
    }

    #[test]
    fn compressed_output_is_cookie_safe() {
        let state = StateTree::from(json!({"text": "a; b, c \"d\" \\ é"}));
        let encoded = encode(&state, &descriptor(true)).unwrap();
        assert!(is_valid_cookie_value(&encoded));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn compression_shrinks_repetitive_state() {
        let state = StateTree::from(json!({"items": vec!["repeat me please"; 64]}));
        let compressed = encode(&state, &descriptor(true)).unwrap();
        let plain = encode(&state, &descriptor(false)).unwrap();
        assert!(compressed.len() < plain.len());
    }

    // -----------------------------------------------------------------------
    // Custom codecs
    // -----------------------------------------------------------------------

    #[test]
    fn custom_codec_is_used() {
        let descriptor = descriptor(false)
            .with_codec(SerializeFn::plain_string(), DeserializeFn::plain_string());
        let locale = StateTree::from(json!("de-CH"));
        let encoded = encode(&locale, &descriptor).unwrap();
        assert_eq!(encoded, "de-CH");
        assert_eq!(decode(&encoded, &descriptor).unwrap(), locale);
    }

    #[test]
    fn custom_serializer_failure_is_encode_error() {
        let descriptor = descriptor(false).with_codec(
            SerializeFn::new(|_| Err(CodecError::new("nope"))),
            DeserializeFn::plain_string(),
        );
        let err = encode(&StateTree::null(), &descriptor).unwrap_err();
        assert!(matches!(err, CookieError::Encode { .. }));
    }

    // -----------------------------------------------------------------------
    // Malformed input
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_tampered_compressed_value() {
        let err = decode("not*base64", &descriptor(true)).unwrap_err();
        assert!(matches!(err, CookieError::Decode { .. }));

        let err = decode(&URL_SAFE_NO_PAD.encode(b"not zstd"), &descriptor(true)).unwrap_err();
        assert!(matches!(err, CookieError::Decode { .. }));
    }

    #[test]
    fn rejects_truncated_compressed_value() {
        let state = StateTree::from(json!({"a": [1, 2, 3, 4, 5]}));
        let encoded = encode(&state, &descriptor(true)).unwrap();
        let truncated = &encoded[..encoded.len() / 2];
        assert!(decode(truncated, &descriptor(true)).is_err());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = decode("%7Bnot%20json", &descriptor(false)).unwrap_err();
        assert!(matches!(err, CookieError::Decode { .. }));
    }

    #[test]
    fn rejects_invalid_utf8_escape() {
        assert!(decode("%FF%FE", &descriptor(false)).is_err());
    }

    // -----------------------------------------------------------------------
    // Round trip
    // -----------------------------------------------------------------------

    #[test]
    fn floats_decode_bit_exact() {
        let value = f64::from_bits(0x305f_050c_368d_cc74);
        for compress in [true, false] {
            let descriptor = descriptor(compress);
            let state = StateTree::from(json!({"x": value, "y": 0.1, "z": -1.5e300}));
            let decoded = decode(&encode(&state, &descriptor).unwrap(), &descriptor).unwrap();
            let x = decoded.child("x").and_then(|x| x.to_value().as_f64()).unwrap();
            assert_eq!(x.to_bits(), value.to_bits());
            assert_eq!(decoded, state);
        }
    }

    proptest! {
        #[test]
        fn round_trips_json_state(value in json_value(), compress in any::<bool>()) {
            let descriptor = descriptor(compress);
            let state = StateTree::from(value);
            let encoded = encode(&state, &descriptor).unwrap();
            prop_assert!(is_valid_cookie_value(&encoded));
            prop_assert_eq!(decode(&encoded, &descriptor).unwrap(), state);
        }
    }
}
