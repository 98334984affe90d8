//! Script model, serializer and interpreter.

use core::fmt;
use std::sync::OnceLock;

use bitcoin::{
    hashes::{hash160, sha256, Hash},
    hex::DisplayHex,
    secp256k1::{self, ecdsa::Signature as EcdsaSignature, Message, PublicKey, Secp256k1},
    Transaction,
};

use crate::{
    opcode::Opcode,
    sighash::{generate_signature_hash, NULL_HASH},
};

const MAX_STACK_SIZE: usize = 1000;
const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
const MAX_NUMBER_SIZE: usize = 4;

/// Failure kinds surfaced by parsing and evaluation.
///
/// The wire contract is only pass/fail; these exist for tests and
/// debugging and are deliberately not part of any serialized format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Evaluation finished with an empty stack or a false top item.
    EvalFalse,
    /// Raw script bytes ended in the middle of a push.
    BadScript,
    /// A push payload exceeds the 520-byte bound.
    PushSize,
    /// Combined stack depth exceeds the 1000-item bound.
    StackSize,
    /// An opcode ran with fewer operands than it needs.
    InvalidStackOperation,
    /// A numeric operand is longer than four bytes.
    NumberOverflow,
    /// A disabled opcode was encountered.
    DisabledOpcode,
    /// A reserved or unimplemented opcode executed.
    BadOpcode,
    /// IF/ELSE/ENDIF nesting never balanced out.
    UnbalancedConditional,
    /// VERIFY saw a false top item.
    Verify,
    /// EQUALVERIFY compared two unequal items.
    EqualVerify,
    /// CHECKSIGVERIFY failed to validate its signature.
    CheckSigVerify,
    /// CHECKMULTISIGVERIFY failed to validate its signatures.
    CheckMultiSigVerify,
    /// A script-hash spend supplied a non-push input script.
    NonPushInput,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ScriptError::*;

        let description = match *self {
            EvalFalse => "script evaluated to false",
            BadScript => "premature end of script",
            PushSize => "push payload exceeds 520 bytes",
            StackSize => "stack depth exceeds 1000 items",
            InvalidStackOperation => "operation on too few stack items",
            NumberOverflow => "numeric operand longer than 4 bytes",
            DisabledOpcode => "disabled opcode",
            BadOpcode => "reserved or unimplemented opcode",
            UnbalancedConditional => "unbalanced conditional",
            Verify => "verify failed",
            EqualVerify => "equalverify failed",
            CheckSigVerify => "checksigverify failed",
            CheckMultiSigVerify => "checkmultisigverify failed",
            NonPushInput => "script-hash input script is not push-only",
        };

        f.write_str(description)
    }
}

impl std::error::Error for ScriptError {}

/// Standard output-script shapes recognized by [`Script::payment_type`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaymentType {
    Pubkey,
    PubkeyHash,
    ScriptHash,
    Multisig,
    NonStandard,
}

/// One opcode together with its pushed payload.
///
/// `data` is empty for every non-push opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub code: Opcode,
    pub data: Vec<u8>,
}

impl Operation {
    /// An operation with no payload.
    pub fn new(code: Opcode) -> Operation {
        Operation {
            code,
            data: Vec::new(),
        }
    }

    /// The canonical push for `data`: the shortest length-prefix form.
    pub fn push(data: Vec<u8>) -> Operation {
        let code = match data.len() {
            0 => Opcode::Zero,
            1..=75 => Opcode::Special,
            76..=0xff => Opcode::Pushdata1,
            0x100..=0xffff => Opcode::Pushdata2,
            _ => Opcode::Pushdata4,
        };
        Operation { code, data }
    }
}

#[derive(Debug, Default, Clone)]
struct ConditionalStack {
    flags: Vec<bool>,
}

impl ConditionalStack {
    fn closed(&self) -> bool {
        self.flags.is_empty()
    }

    fn has_failed_branches(&self) -> bool {
        self.flags.iter().any(|flag| !flag)
    }

    fn clear(&mut self) {
        self.flags.clear();
    }

    fn open(&mut self, value: bool) {
        self.flags.push(value);
    }

    fn reverse(&mut self) {
        if let Some(top) = self.flags.last_mut() {
            *top = !*top;
        }
    }

    fn close(&mut self) {
        self.flags.pop();
    }
}

/// An operation sequence plus the evaluation state of one run.
///
/// The state (both stacks, the conditional stack and the codehash cursor)
/// belongs exclusively to this value; independent evaluations on separate
/// `Script` values may proceed concurrently.
#[derive(Debug, Default, Clone)]
pub struct Script {
    operations: Vec<Operation>,
    stack: Vec<Vec<u8>>,
    alternate_stack: Vec<Vec<u8>>,
    conditional_stack: ConditionalStack,
    codehash_begin: usize,
}

impl PartialEq for Script {
    /// Two scripts are the same program when their operations match;
    /// run-time state does not participate.
    fn eq(&self, other: &Script) -> bool {
        self.operations == other.operations
    }
}

impl Eq for Script {}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty(self))
    }
}

impl Script {
    pub fn new() -> Script {
        Script::default()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn push_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Appends another script's operations to this one.
    pub fn join(&mut self, other: &Script) {
        self.operations.extend_from_slice(&other.operations);
    }

    /// The evaluation stack left behind by the last run.
    pub fn stack(&self) -> &[Vec<u8>] {
        &self.stack
    }

    /// Classifies this script as an output-script pattern.
    pub fn payment_type(&self) -> PaymentType {
        if is_pubkey_type(&self.operations) {
            return PaymentType::Pubkey;
        }
        if is_pubkey_hash_type(&self.operations) {
            return PaymentType::PubkeyHash;
        }
        if is_script_hash_type(&self.operations) {
            return PaymentType::ScriptHash;
        }
        if is_multisig_type(&self.operations) {
            return PaymentType::Multisig;
        }
        PaymentType::NonStandard
    }

    /// Runs `input_script` followed by this output script against one
    /// transaction input, carrying only the main stack across the two
    /// executions, then applies the script-hash (BIP16) rule if enabled.
    pub fn run(
        &mut self,
        mut input_script: Script,
        tx: &Transaction,
        input_index: u32,
        bip16_enabled: bool,
    ) -> Result<(), ScriptError> {
        self.stack.clear();
        input_script.stack.clear();
        input_script.run_single(tx, input_index)?;
        self.stack.clone_from(&input_script.stack);
        self.run_single(tx, input_index)?;
        match self.stack.last() {
            Some(top) if cast_to_bool(top) => {}
            _ => return Err(ScriptError::EvalFalse),
        }
        if bip16_enabled && self.payment_type() == PaymentType::ScriptHash {
            if !is_push_only(&input_script.operations) {
                return Err(ScriptError::NonPushInput);
            }
            // The input script's own stack still holds the serialized
            // redeem script on top; everything beneath seeds its run.
            let mut eval_stack = input_script.stack;
            let redeem_bytes = eval_stack.pop().ok_or(ScriptError::EvalFalse)?;
            let mut eval_script = parse_script(&redeem_bytes)?;
            eval_script.stack = eval_stack;
            eval_script.run_single(tx, input_index)?;
            match eval_script.stack.last() {
                Some(top) if cast_to_bool(top) => {}
                _ => return Err(ScriptError::EvalFalse),
            }
        }
        Ok(())
    }

    /// Executes this script's operations on whatever is already seeded in
    /// `self.stack`. The alternate and conditional stacks and the codehash
    /// cursor are reset; the main stack intentionally is not.
    fn run_single(&mut self, tx: &Transaction, input_index: u32) -> Result<(), ScriptError> {
        self.alternate_stack.clear();
        self.conditional_stack.clear();
        self.codehash_begin = 0;
        for index in 0..self.operations.len() {
            self.next_step(index, tx, input_index)?;
        }
        if !self.conditional_stack.closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        Ok(())
    }

    fn next_step(
        &mut self,
        index: usize,
        tx: &Transaction,
        input_index: u32,
    ) -> Result<(), ScriptError> {
        let operation = self.operations[index].clone();
        if operation.code.is_disabled() {
            return Err(ScriptError::DisabledOpcode);
        }
        if operation.code == Opcode::Codeseparator {
            // The cursor moves even inside a non-executing branch.
            self.codehash_begin = index;
            return Ok(());
        }
        if self.conditional_stack.has_failed_branches() && !operation.code.is_condition() {
            return Ok(());
        }
        match operation.code {
            Opcode::Zero => self.stack.push(Vec::new()),
            Opcode::Special | Opcode::Pushdata1 | Opcode::Pushdata2 | Opcode::Pushdata4 => {
                self.stack.push(operation.data)
            }
            _ => self.run_operation(&operation, tx, input_index)?,
        }
        if self.stack.len() + self.alternate_stack.len() > MAX_STACK_SIZE {
            return Err(ScriptError::StackSize);
        }
        Ok(())
    }

    fn run_operation(
        &mut self,
        operation: &Operation,
        tx: &Transaction,
        input_index: u32,
    ) -> Result<(), ScriptError> {
        use Opcode::*;

        match operation.code {
            // Push forms and the codehash cursor never reach the dispatcher.
            Zero | Special | Pushdata1 | Pushdata2 | Pushdata4 | Codeseparator => {
                Err(ScriptError::BadOpcode)
            }

            Negative1 => self.op_negative_1(),

            Reserved | Ver | Verif | Vernotif | Reserved1 | Reserved2 | Return | RawData => {
                Err(ScriptError::BadOpcode)
            }

            Op1 | Op2 | Op3 | Op4 | Op5 | Op6 | Op7 | Op8 | Op9 | Op10 | Op11 | Op12 | Op13
            | Op14 | Op15 | Op16 => self.op_x(operation.code),

            Nop | Nop1 | Nop2 | Nop3 | Nop4 | Nop5 | Nop6 | Nop7 | Nop8 | Nop9 | Nop10 => Ok(()),

            If => self.op_if(),
            Notif => self.op_notif(),
            Else => self.op_else(),
            Endif => self.op_endif(),
            Verify => self.op_verify(),

            Toaltstack => self.op_toaltstack(),
            Fromaltstack => self.op_fromaltstack(),
            Ifdup => self.op_ifdup(),
            Depth => self.op_depth(),
            Drop => self.op_drop(),
            Dup => self.op_dup(),
            Nip => self.op_nip(),
            Over => self.op_over(),
            Pick => self.pick_roll_impl(false),
            Roll => self.pick_roll_impl(true),
            Size => self.op_size(),

            Not => self.op_not(),
            Boolor => self.op_boolor(),
            Min => self.op_min(),
            Equal => self.op_equal(),
            Equalverify => self.op_equalverify(),
            Add => self.op_add(),
            Greaterthanorequal => self.op_greaterthanorequal(),

            Sha256 => self.op_sha256(),
            Hash160 => self.op_hash160(),
            Checksig => self.op_checksig(tx, input_index),
            Checksigverify => self.op_checksigverify(tx, input_index),
            Checkmultisig => self.op_checkmultisig(tx, input_index),
            Checkmultisigverify => self.op_checkmultisigverify(tx, input_index),

            BadOperation => {
                log::error!("unimplemented operation <none {}>", operation.code as u8);
                Err(ScriptError::BadOpcode)
            }
        }
    }

    fn pop_stack(&mut self) -> Result<Vec<u8>, ScriptError> {
        self.stack.pop().ok_or(ScriptError::InvalidStackOperation)
    }

    fn push_bool(&mut self, value: bool) {
        if value {
            self.stack.push(vec![1]);
        } else {
            self.stack.push(Vec::new());
        }
    }

    /// Pops the two operands of a binary numeric opcode. The first pop is
    /// operand `a`, the second operand `b`; non-commutative opcodes apply
    /// `f(a, b)` in that order.
    fn arithmetic_start(&mut self) -> Result<(i64, i64), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let number_a = decode_number(&self.pop_stack()?)?;
        let number_b = decode_number(&self.pop_stack()?)?;
        Ok((number_a, number_b))
    }

    fn op_negative_1(&mut self) -> Result<(), ScriptError> {
        self.stack.push(encode_number(-1));
        Ok(())
    }

    fn op_x(&mut self, code: Opcode) -> Result<(), ScriptError> {
        let value = code as u8 - Opcode::Op1 as u8 + 1;
        self.stack.push(encode_number(value as i64));
        Ok(())
    }

    fn op_if(&mut self) -> Result<(), ScriptError> {
        let mut value = false;
        if !self.conditional_stack.has_failed_branches() {
            value = cast_to_bool(&self.pop_stack()?);
        }
        self.conditional_stack.open(value);
        Ok(())
    }

    fn op_notif(&mut self) -> Result<(), ScriptError> {
        // Open an IF, then invert it.
        self.op_if()?;
        self.conditional_stack.reverse();
        Ok(())
    }

    fn op_else(&mut self) -> Result<(), ScriptError> {
        if self.conditional_stack.closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        self.conditional_stack.reverse();
        Ok(())
    }

    fn op_endif(&mut self) -> Result<(), ScriptError> {
        if self.conditional_stack.closed() {
            return Err(ScriptError::UnbalancedConditional);
        }
        self.conditional_stack.close();
        Ok(())
    }

    fn op_verify(&mut self) -> Result<(), ScriptError> {
        match self.stack.last() {
            None => Err(ScriptError::InvalidStackOperation),
            Some(top) if !cast_to_bool(top) => Err(ScriptError::Verify),
            Some(_) => {
                self.pop_stack()?;
                Ok(())
            }
        }
    }

    fn op_toaltstack(&mut self) -> Result<(), ScriptError> {
        let value = self.pop_stack()?;
        self.alternate_stack.push(value);
        Ok(())
    }

    fn op_fromaltstack(&mut self) -> Result<(), ScriptError> {
        let value = self
            .alternate_stack
            .pop()
            .ok_or(ScriptError::InvalidStackOperation)?;
        self.stack.push(value);
        Ok(())
    }

    fn op_ifdup(&mut self) -> Result<(), ScriptError> {
        let top = self
            .stack
            .last()
            .ok_or(ScriptError::InvalidStackOperation)?;
        if cast_to_bool(top) {
            let copy = top.clone();
            self.stack.push(copy);
        }
        Ok(())
    }

    fn op_depth(&mut self) -> Result<(), ScriptError> {
        let depth = encode_number(self.stack.len() as i64);
        self.stack.push(depth);
        Ok(())
    }

    fn op_drop(&mut self) -> Result<(), ScriptError> {
        self.pop_stack()?;
        Ok(())
    }

    fn op_dup(&mut self) -> Result<(), ScriptError> {
        let top = self
            .stack
            .last()
            .ok_or(ScriptError::InvalidStackOperation)?
            .clone();
        self.stack.push(top);
        Ok(())
    }

    fn op_nip(&mut self) -> Result<(), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let index = self.stack.len() - 2;
        self.stack.remove(index);
        Ok(())
    }

    fn op_over(&mut self) -> Result<(), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let value = self.stack[self.stack.len() - 2].clone();
        self.stack.push(value);
        Ok(())
    }

    fn pick_roll_impl(&mut self, is_roll: bool) -> Result<(), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let depth = decode_number(&self.pop_stack()?)?;
        if depth < 0 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let depth = depth as usize;
        if depth >= self.stack.len() {
            return Err(ScriptError::InvalidStackOperation);
        }
        let index = self.stack.len() - depth - 1;
        let item = if is_roll {
            self.stack.remove(index)
        } else {
            self.stack[index].clone()
        };
        self.stack.push(item);
        Ok(())
    }

    fn op_size(&mut self) -> Result<(), ScriptError> {
        let size = self
            .stack
            .last()
            .map(|top| encode_number(top.len() as i64))
            .ok_or(ScriptError::InvalidStackOperation)?;
        self.stack.push(size);
        Ok(())
    }

    fn op_not(&mut self) -> Result<(), ScriptError> {
        let number = decode_number(&self.pop_stack()?)?;
        self.push_bool(number == 0);
        Ok(())
    }

    fn op_boolor(&mut self) -> Result<(), ScriptError> {
        let (number_a, number_b) = self.arithmetic_start()?;
        self.push_bool(number_a != 0 || number_b != 0);
        Ok(())
    }

    fn op_min(&mut self) -> Result<(), ScriptError> {
        let (number_a, number_b) = self.arithmetic_start()?;
        self.stack.push(encode_number(number_a.min(number_b)));
        Ok(())
    }

    fn op_equal(&mut self) -> Result<(), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let equal = self.pop_stack()? == self.pop_stack()?;
        self.push_bool(equal);
        Ok(())
    }

    fn op_equalverify(&mut self) -> Result<(), ScriptError> {
        if self.stack.len() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        if self.pop_stack()? == self.pop_stack()? {
            Ok(())
        } else {
            Err(ScriptError::EqualVerify)
        }
    }

    fn op_add(&mut self) -> Result<(), ScriptError> {
        let (number_a, number_b) = self.arithmetic_start()?;
        self.stack.push(encode_number(number_a + number_b));
        Ok(())
    }

    fn op_greaterthanorequal(&mut self) -> Result<(), ScriptError> {
        let (number_a, number_b) = self.arithmetic_start()?;
        self.push_bool(number_a >= number_b);
        Ok(())
    }

    fn op_sha256(&mut self) -> Result<(), ScriptError> {
        let data = self.pop_stack()?;
        let hash = sha256::Hash::hash(&data);
        self.stack.push(hash.to_byte_array().to_vec());
        Ok(())
    }

    fn op_hash160(&mut self) -> Result<(), ScriptError> {
        let data = self.pop_stack()?;
        let hash = hash160::Hash::hash(&data);
        self.stack.push(hash.to_byte_array().to_vec());
        Ok(())
    }

    fn op_checksig(&mut self, tx: &Transaction, input_index: u32) -> Result<(), ScriptError> {
        let result = self.checksig_core(tx, input_index);
        self.push_bool(result);
        Ok(())
    }

    fn op_checksigverify(&mut self, tx: &Transaction, input_index: u32) -> Result<(), ScriptError> {
        if self.checksig_core(tx, input_index) {
            Ok(())
        } else {
            Err(ScriptError::CheckSigVerify)
        }
    }

    /// Pops pubkey then signature and verifies the signature against the
    /// scriptcode: every operation from the codehash cursor onwards except
    /// CODESEPARATOR and pushes of the signature itself. Any failure,
    /// including an underfull stack, reads as an invalid signature.
    fn checksig_core(&mut self, tx: &Transaction, input_index: u32) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let Ok(pubkey) = self.pop_stack() else {
            return false;
        };
        let Ok(signature) = self.pop_stack() else {
            return false;
        };

        let mut script_code = Script::new();
        for operation in &self.operations[self.codehash_begin..] {
            if operation.data == signature || operation.code == Opcode::Codeseparator {
                continue;
            }
            script_code.push_operation(operation.clone());
        }
        check_signature(&signature, &pubkey, &script_code, tx, input_index)
    }

    fn op_checkmultisig(&mut self, tx: &Transaction, input_index: u32) -> Result<(), ScriptError> {
        let result = self.multisig_core(tx, input_index);
        self.push_bool(result);
        Ok(())
    }

    fn op_checkmultisigverify(
        &mut self,
        tx: &Transaction,
        input_index: u32,
    ) -> Result<(), ScriptError> {
        if self.multisig_core(tx, input_index) {
            Ok(())
        } else {
            Err(ScriptError::CheckMultiSigVerify)
        }
    }

    /// Pops a count and then that many items.
    fn read_section(&mut self) -> Option<Vec<Vec<u8>>> {
        let count_bytes = self.stack.pop()?;
        let count = decode_number(&count_bytes).ok()?;
        if count < 0 || count as usize > self.stack.len() {
            return None;
        }
        let mut section = Vec::with_capacity(count as usize);
        for _ in 0..count {
            section.push(self.stack.pop()?);
        }
        Some(section)
    }

    /// Reads the pubkey section, then the signature section, and checks
    /// the signatures in order against an advancing pubkey cursor. A
    /// signature may match the cursor's pubkey or any later one; running
    /// out of pubkeys before the signatures are exhausted fails. No dummy
    /// element is consumed.
    fn multisig_core(&mut self, tx: &Transaction, input_index: u32) -> bool {
        let Some(pubkeys) = self.read_section() else {
            return false;
        };
        let Some(signatures) = self.read_section() else {
            return false;
        };

        let mut script_code = Script::new();
        for operation in &self.operations[self.codehash_begin..] {
            if operation.code == Opcode::Codeseparator {
                continue;
            }
            if signatures.contains(&operation.data) {
                continue;
            }
            script_code.push_operation(operation.clone());
        }

        let mut key_index = 0;
        for signature in &signatures {
            let mut candidate = key_index;
            loop {
                if candidate >= pubkeys.len() {
                    return false;
                }
                if check_signature(signature, &pubkeys[candidate], &script_code, tx, input_index) {
                    key_index = candidate;
                    break;
                }
                candidate += 1;
            }
        }
        true
    }
}

static SECP256K1: OnceLock<Secp256k1<secp256k1::VerifyOnly>> = OnceLock::new();

fn secp_verification_ctx() -> &'static Secp256k1<secp256k1::VerifyOnly> {
    SECP256K1.get_or_init(Secp256k1::verification_only)
}

/// Verifies one `<DER signature || hash_type>` blob against a pubkey and
/// scriptcode for the given transaction input. The all-zero digest from
/// the sighash builder means "do not verify" and fails here.
fn check_signature(
    signature: &[u8],
    pubkey: &[u8],
    script_code: &Script,
    tx: &Transaction,
    input_index: u32,
) -> bool {
    let Ok(key) = PublicKey::from_slice(pubkey) else {
        return false;
    };
    let Some((&hash_type, der_bytes)) = signature.split_last() else {
        return false;
    };

    let digest = generate_signature_hash(tx, input_index, script_code, hash_type as u32);
    if digest == NULL_HASH {
        return false;
    }

    let Ok(parsed) = EcdsaSignature::from_der_lax(der_bytes) else {
        return false;
    };
    let mut normalized = parsed;
    normalized.normalize_s();
    let message = Message::from_digest(digest);
    secp_verification_ctx()
        .verify_ecdsa(&message, &normalized, &key)
        .is_ok()
}

fn is_pubkey_type(operations: &[Operation]) -> bool {
    operations.len() == 2
        && operations[0].code == Opcode::Special
        && operations[1].code == Opcode::Checksig
}

fn is_pubkey_hash_type(operations: &[Operation]) -> bool {
    operations.len() == 5
        && operations[0].code == Opcode::Dup
        && operations[1].code == Opcode::Hash160
        && operations[2].code == Opcode::Special
        && operations[2].data.len() == 20
        && operations[3].code == Opcode::Equalverify
        && operations[4].code == Opcode::Checksig
}

fn is_script_hash_type(operations: &[Operation]) -> bool {
    operations.len() == 3
        && operations[0].code == Opcode::Hash160
        && operations[1].code == Opcode::Special
        && operations[1].data.len() == 20
        && operations[2].code == Opcode::Equal
}

fn is_multisig_type(_operations: &[Operation]) -> bool {
    // Bare multisig recognition is reserved for a future extension.
    false
}

/// True when every operation only pushes data.
pub fn is_push_only(operations: &[Operation]) -> bool {
    operations.iter().all(|operation| operation.code.is_push())
}

/// Wraps raw coinbase bytes in a single `RawData` carrier operation.
///
/// Coinbase input scripts are not scripts at all; the carrier lets them
/// flow through serialization untouched while failing if ever executed.
pub fn coinbase_script(raw_script: &[u8]) -> Script {
    let mut script = Script::new();
    script.push_operation(Operation {
        code: Opcode::RawData,
        data: raw_script.to_vec(),
    });
    script
}

/// Parses raw script bytes into an operation sequence.
pub fn parse_script(raw_script: &[u8]) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    let mut cursor = 0;
    while cursor < raw_script.len() {
        let raw_byte = raw_script[cursor];
        cursor += 1;
        let code = Opcode::from_wire_byte(raw_byte);
        let data = match code {
            Opcode::Special => read_push_data(raw_script, &mut cursor, raw_byte as usize)?,
            Opcode::Pushdata1 => {
                let length = read_push_length(raw_script, &mut cursor, 1)?;
                read_push_data(raw_script, &mut cursor, length)?
            }
            Opcode::Pushdata2 => {
                let length = read_push_length(raw_script, &mut cursor, 2)?;
                read_push_data(raw_script, &mut cursor, length)?
            }
            Opcode::Pushdata4 => {
                let length = read_push_length(raw_script, &mut cursor, 4)?;
                read_push_data(raw_script, &mut cursor, length)?
            }
            _ => Vec::new(),
        };
        script.push_operation(Operation { code, data });
    }
    Ok(script)
}

fn read_push_length(bytes: &[u8], cursor: &mut usize, width: usize) -> Result<usize, ScriptError> {
    if bytes.len() - *cursor < width {
        log::warn!("premature end of script");
        return Err(ScriptError::BadScript);
    }
    let mut length = 0;
    for i in 0..width {
        length |= (bytes[*cursor + i] as usize) << (8 * i);
    }
    *cursor += width;
    Ok(length)
}

fn read_push_data(bytes: &[u8], cursor: &mut usize, length: usize) -> Result<Vec<u8>, ScriptError> {
    if length > MAX_SCRIPT_ELEMENT_SIZE {
        return Err(ScriptError::PushSize);
    }
    if bytes.len() - *cursor < length {
        log::warn!("premature end of script");
        return Err(ScriptError::BadScript);
    }
    let data = bytes[*cursor..*cursor + length].to_vec();
    *cursor += length;
    Ok(data)
}

/// Serializes an operation sequence back to raw script bytes.
///
/// A script holding a single `RawData` carrier emits its payload verbatim.
pub fn save_script(script: &Script) -> Vec<u8> {
    let operations = script.operations();
    if operations.is_empty() {
        return Vec::new();
    }
    if operations[0].code == Opcode::RawData {
        return operations[0].data.clone();
    }
    let mut raw_script = Vec::new();
    for operation in operations {
        let raw_byte = if operation.code == Opcode::Special {
            operation.data.len() as u8
        } else {
            operation.code as u8
        };
        raw_script.push(raw_byte);
        match operation.code {
            Opcode::Pushdata1 => raw_script.push(operation.data.len() as u8),
            Opcode::Pushdata2 => {
                raw_script.extend_from_slice(&(operation.data.len() as u16).to_le_bytes())
            }
            Opcode::Pushdata4 => {
                raw_script.extend_from_slice(&(operation.data.len() as u32).to_le_bytes())
            }
            _ => {}
        }
        raw_script.extend_from_slice(&operation.data);
    }
    raw_script
}

/// Renders a script as space-separated mnemonics, with push payloads as
/// bracketed hex.
pub fn pretty(script: &Script) -> String {
    let mut out = String::new();
    for (index, operation) in script.operations().iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        if operation.data.is_empty() {
            out.push_str(operation.code.name());
        } else {
            out.push_str("[ ");
            out.push_str(&operation.data.to_lower_hex_string());
            out.push_str(" ]");
        }
    }
    out
}

/// Boolean reading of a stack item: any non-zero byte makes it true,
/// except negative zero (sign bit alone in the last byte).
pub fn cast_to_bool(data: &[u8]) -> bool {
    for (i, &byte) in data.iter().enumerate() {
        if byte != 0 {
            if i == data.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

/// Minimal little-endian signed encoding with the sign carried by the
/// high bit of the last byte. Zero encodes to no bytes at all.
pub fn encode_number(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut magnitude = value.unsigned_abs();
    while magnitude > 0 {
        result.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    if let Some(last) = result.last_mut() {
        if *last & 0x80 != 0 {
            result.push(if value < 0 { 0x80 } else { 0x00 });
        } else if value < 0 {
            *last |= 0x80;
        }
    }

    result
}

/// Inverse of [`encode_number`], limited to four input bytes.
pub fn decode_number(bytes: &[u8]) -> Result<i64, ScriptError> {
    if bytes.len() > MAX_NUMBER_SIZE {
        return Err(ScriptError::NumberOverflow);
    }
    if bytes.is_empty() {
        return Ok(0);
    }

    let mut result: i64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        result |= (byte as i64) << (8 * i);
    }

    let last = bytes[bytes.len() - 1];
    if last & 0x80 != 0 {
        let mask = !(0x80i64 << (8 * (bytes.len() - 1)));
        Ok(-(result & mask))
    } else {
        Ok(result)
    }
}
