//! # Contract Key Hashing
//!
//! Global key hash stored in `create_key_hash`, used by key lookups.
//!
//! The hash is SHA-256 over a tagged, length-prefixed encoding of the template
//! id, package name and key value. It depends only on the logical key, never
//! on the injected serializer, so changing the serialization strategy does not
//! invalidate existing key lookups.

use sha2::{Digest, Sha256};
use shared_types::{PackageName, TemplateId, Value};

/// Domain separator for contract key hashes.
const KEY_HASH_PURPOSE: &[u8] = b"pn.contract-key.v1";

/// Hash a contract key, hex encoded.
pub fn hash_contract_key(
    template_id: &TemplateId,
    package_name: &PackageName,
    key: &Value,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(KEY_HASH_PURPOSE);
    update_str(&mut hasher, &template_id.to_string());
    update_str(&mut hasher, package_name.as_str());
    update_value(&mut hasher, key);
    hex::encode(hasher.finalize())
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

fn update_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Unit => hasher.update([0u8]),
        Value::Bool(flag) => hasher.update([1u8, u8::from(*flag)]),
        Value::Int64(number) => {
            hasher.update([2u8]);
            hasher.update(number.to_be_bytes());
        }
        Value::Numeric(numeric) => {
            hasher.update([3u8]);
            update_str(hasher, numeric);
        }
        Value::Text(text) => {
            hasher.update([4u8]);
            update_str(hasher, text);
        }
        Value::Timestamp(timestamp) => {
            hasher.update([5u8]);
            hasher.update(timestamp.micros().to_be_bytes());
        }
        Value::Party(party) => {
            hasher.update([6u8]);
            update_str(hasher, party.as_str());
        }
        Value::ContractId(contract_id) => {
            hasher.update([7u8]);
            update_str(hasher, contract_id.as_str());
        }
        Value::Optional(inner) => {
            hasher.update([8u8]);
            match inner {
                Some(inner) => {
                    hasher.update([1u8]);
                    update_value(hasher, inner);
                }
                None => hasher.update([0u8]),
            }
        }
        Value::List(items) => {
            hasher.update([9u8]);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                update_value(hasher, item);
            }
        }
        // Field names are not part of the key identity, only values in order.
        Value::Record(fields) => {
            hasher.update([10u8]);
            hasher.update((fields.len() as u64).to_be_bytes());
            for (_, field) in fields {
                update_value(hasher, field);
            }
        }
        Value::Variant { constructor, value } => {
            hasher.update([11u8]);
            update_str(hasher, constructor);
            update_value(hasher, value);
        }
    }
}
