use bitcoin::blockdata::opcodes::all::OP_CHECKMULTISIG;
use bitcoin::blockdata::opcodes::{Class, ClassifyContext};
use bitcoin::script::Instruction;
use bitcoin::{Address, Network, Script};
use serde::Serialize;

/// Standard output script templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptClass {
    PubkeyHash,
    Pubkey,
    ScriptHash,
    Multisig { required: u8, keys: u8 },
    NullData,
    Nonstandard,
}

impl ScriptClass {
    pub fn of(script: &Script) -> Self {
        if script.is_p2pkh() {
            Self::PubkeyHash
        } else if script.is_p2pk() {
            Self::Pubkey
        } else if script.is_p2sh() {
            Self::ScriptHash
        } else if script.is_op_return() {
            Self::NullData
        } else if let Some((required, keys)) = multisig_counts(script) {
            Self::Multisig { required, keys }
        } else {
            Self::Nonstandard
        }
    }
}

/// `OP_m <key>... OP_n OP_CHECKMULTISIG` with `1 <= m <= n` and exactly `n`
/// key pushes of 33 or 65 bytes.
fn multisig_counts(script: &Script) -> Option<(u8, u8)> {
    let instructions = script.instructions().collect::<Result<Vec<_>, _>>().ok()?;
    let (first, rest) = instructions.split_first()?;
    let (last, rest) = rest.split_last()?;
    let (count, keys) = rest.split_last()?;

    if *last != Instruction::Op(OP_CHECKMULTISIG) {
        return None;
    }
    let required = push_num(first)?;
    let total = push_num(count)?;
    if required == 0 || required > total || keys.len() != usize::from(total) {
        return None;
    }
    let all_keys = keys.iter().all(|key| {
        matches!(key, Instruction::PushBytes(bytes) if matches!(bytes.len(), 33 | 65))
    });
    all_keys.then_some((required, total))
}

fn push_num(instruction: &Instruction<'_>) -> Option<u8> {
    match instruction {
        Instruction::Op(op) => match op.classify(ClassifyContext::Legacy) {
            Class::PushNum(n) => u8::try_from(n).ok(),
            _ => None,
        },
        Instruction::PushBytes(_) => None,
    }
}

/// Addresses an output pays, derived from the script alone.
///
/// A bare pubkey pays the address of its key hash. Multisig and data
/// carriers have no single address and yield nothing.
pub fn derive_addresses(script: &Script) -> Vec<String> {
    if let Some(pubkey) = script.p2pk_public_key() {
        return vec![Address::p2pkh(pubkey.pubkey_hash(), Network::Bitcoin).to_string()];
    }
    Address::from_script(script, Network::Bitcoin)
        .map(|address| vec![address.to_string()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use bitcoin::ScriptBuf;

    use super::*;

    // Output 0 of the block 9 coinbase (pays the key that signed the first
    // ever transaction).
    const GENESIS_ERA_P2PK: &str = "410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac";

    fn script(hex: &str) -> ScriptBuf {
        ScriptBuf::from_hex(hex).expect("test script must be hex")
    }

    #[test]
    fn pubkey_hash_output() {
        let s = script("76a91462e907b15cbf27d5425399ebf6f0fb50ebb88f1888ac");
        assert_eq!(ScriptClass::of(&s), ScriptClass::PubkeyHash);
        assert_eq!(derive_addresses(&s), vec!["1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"]);
        assert!(s.to_asm_string().starts_with("OP_DUP OP_HASH160"));
    }

    #[test]
    fn bare_pubkey_output_pays_its_key_hash() {
        let s = script(GENESIS_ERA_P2PK);
        assert_eq!(ScriptClass::of(&s), ScriptClass::Pubkey);
        assert_eq!(derive_addresses(&s), vec!["12cbQLTFMXRnSzktFkuoG3eHoMeFtpTu3S"]);
        assert!(s.to_asm_string().ends_with("OP_CHECKSIG"));
    }

    #[test]
    fn script_hash_output() {
        let s = script("a914748284390f9e263a4b766a75d0633c50426eb87587");
        assert_eq!(ScriptClass::of(&s), ScriptClass::ScriptHash);
        assert_eq!(derive_addresses(&s).len(), 1);
        assert!(derive_addresses(&s)[0].starts_with('3'));
    }

    #[test]
    fn one_of_two_multisig() {
        let key = "02".to_owned() + &"11".repeat(32);
        let hex = format!("5121{key}21{key}52ae");
        let s = script(&hex);
        assert_eq!(
            ScriptClass::of(&s),
            ScriptClass::Multisig {
                required: 1,
                keys: 2
            }
        );
        assert!(derive_addresses(&s).is_empty());
    }

    #[test]
    fn multisig_with_wrong_key_count_is_nonstandard() {
        let key = "02".to_owned() + &"11".repeat(32);
        let hex = format!("5121{key}53ae");
        assert_eq!(ScriptClass::of(&script(&hex)), ScriptClass::Nonstandard);
    }

    #[test]
    fn op_return_output() {
        let s = script("6a0568656c6c6f");
        assert_eq!(ScriptClass::of(&s), ScriptClass::NullData);
        assert!(derive_addresses(&s).is_empty());
        assert_eq!(s.to_asm_string(), "OP_RETURN OP_PUSHBYTES_5 68656c6c6f");
    }

    #[test]
    fn anything_else_is_nonstandard() {
        let s = script("51");
        assert_eq!(ScriptClass::of(&s), ScriptClass::Nonstandard);
        assert!(derive_addresses(&s).is_empty());
    }
}
