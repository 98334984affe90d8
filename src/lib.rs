//! Stack-based transaction script interpreter.
//!
//! The crate decides whether a spending transaction input is authorized to
//! consume a prior output. Each output carries a locking script and each
//! input an unlocking script; [`evaluate`] concatenates their executions on
//! one evaluation stack and reports pass or fail from the final top item,
//! applying the pay-to-script-hash rule when enabled.
//!
//! The transaction model, its canonical serialization and the hash and
//! ECDSA primitives are consumed from the `bitcoin` crate; everything the
//! interpreter itself owns lives here.

mod opcode;
mod script;
mod sighash;

pub use opcode::{Opcode, DISABLED_OPCODES};
pub use script::{
    cast_to_bool, coinbase_script, decode_number, encode_number, is_push_only, parse_script,
    pretty, save_script, Operation, PaymentType, Script, ScriptError,
};
pub use sighash::{
    generate_signature_hash, hash_transaction, NULL_HASH, SIGHASH_ALL, SIGHASH_ANYONE_CAN_PAY,
    SIGHASH_NONE, SIGHASH_SINGLE,
};

use bitcoin::Transaction;

/// Evaluates one spend: the input script, then the output script, then the
/// script-hash rule when `bip16_enabled`. Every failure collapses to
/// `false`; use [`evaluate_with_details`] to see why.
pub fn evaluate(
    input_script: &[u8],
    output_script: &[u8],
    tx: &Transaction,
    input_index: u32,
    bip16_enabled: bool,
) -> bool {
    evaluate_with_details(input_script, output_script, tx, input_index, bip16_enabled).is_ok()
}

/// Same as [`evaluate`] but reports the interpreter's failure kind.
pub fn evaluate_with_details(
    input_script: &[u8],
    output_script: &[u8],
    tx: &Transaction,
    input_index: u32,
    bip16_enabled: bool,
) -> Result<(), ScriptError> {
    let input = parse_script(input_script)?;
    let mut output = parse_script(output_script)?;
    output.run(input, tx, input_index, bip16_enabled)
}

/// Classifies raw output-script bytes as a standard payment pattern.
///
/// Bytes that do not parse are non-standard by definition.
pub fn classify(output_script: &[u8]) -> PaymentType {
    match parse_script(output_script) {
        Ok(script) => script.payment_type(),
        Err(_) => PaymentType::NonStandard,
    }
}
