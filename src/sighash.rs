//! Signature-hash construction.
//!
//! A signature commits to a rewritten copy of the spending transaction.
//! Which parts survive the rewrite is selected by the `hash_type` byte
//! carried at the tail of every signature.

use bitcoin::{
    consensus,
    hashes::{sha256d, Hash},
    Amount, ScriptBuf, Sequence, Transaction, TxIn, Witness,
};

use crate::script::{save_script, Script};

/// Commit to every input and output.
pub const SIGHASH_ALL: u32 = 1;
/// Commit to the inputs only; outputs are cleared.
pub const SIGHASH_NONE: u32 = 2;
/// Commit to the single output paired with the signed input.
pub const SIGHASH_SINGLE: u32 = 3;
/// Commit to the signed input alone; other inputs may change freely.
pub const SIGHASH_ANYONE_CAN_PAY: u32 = 0x80;

/// The "do not verify" sentinel digest. Signature checks treat it as an
/// immediate failure rather than an error.
pub const NULL_HASH: [u8; 32] = [0; 32];

/// Double-SHA256 of the canonical transaction serialization with
/// `hash_type` appended as a 4-byte little-endian tail.
pub fn hash_transaction(tx: &Transaction, hash_type: u32) -> [u8; 32] {
    let mut preimage = consensus::serialize(tx);
    preimage.extend_from_slice(&hash_type.to_le_bytes());
    sha256d::Hash::hash(&preimage).to_byte_array()
}

/// Rewrites a copy of `tx` into the canonical form selected by
/// `hash_type`, installs `script_code` on the signed input, and hashes
/// the result. The caller's transaction is never touched.
///
/// Out-of-range indices produce [`NULL_HASH`] instead of an error; the
/// caller then sees an ordinary signature failure.
pub fn generate_signature_hash(
    tx: &Transaction,
    input_index: u32,
    script_code: &Script,
    hash_type: u32,
) -> [u8; 32] {
    let index = input_index as usize;
    let mut rewritten = tx.clone();

    if hash_type & 0x1f == SIGHASH_NONE {
        rewritten.output.clear();
        nullify_input_sequences(&mut rewritten.input, index);
    } else if hash_type & 0x1f == SIGHASH_SINGLE {
        if index >= rewritten.output.len() {
            log::error!("sighash single: output index {} is out of range", input_index);
            return NULL_HASH;
        }
        rewritten.output.truncate(index + 1);
        for output in &mut rewritten.output[..index] {
            output.value = Amount::from_sat(u64::MAX);
            output.script_pubkey = ScriptBuf::new();
        }
        nullify_input_sequences(&mut rewritten.input, index);
    }

    if hash_type & SIGHASH_ANYONE_CAN_PAY != 0 {
        let Some(kept) = rewritten.input.get(index).cloned() else {
            log::error!("input index {} is out of range", input_index);
            return NULL_HASH;
        };
        rewritten.input = vec![kept];
    }

    if index >= rewritten.input.len() {
        log::error!("input index {} is out of range", input_index);
        return NULL_HASH;
    }

    // Blank every input script, then substitute the scriptcode on the
    // signed input. The preimage stays in pre-witness encoding.
    for input in &mut rewritten.input {
        input.script_sig = ScriptBuf::new();
        input.witness = Witness::default();
    }
    rewritten.input[index].script_sig = ScriptBuf::from_bytes(save_script(script_code));

    hash_transaction(&rewritten, hash_type)
}

fn nullify_input_sequences(inputs: &mut [TxIn], except_input: usize) {
    for (i, input) in inputs.iter_mut().enumerate() {
        if i != except_input {
            input.sequence = Sequence::ZERO;
        }
    }
}
