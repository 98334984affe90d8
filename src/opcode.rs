//! Opcode registry: wire bytes, mnemonics and category predicates.

use core::fmt;

/// Opcodes understood by the interpreter.
///
/// The discriminant is the wire byte for every opcode that has one.
/// `Special` stands for the direct pushes (wire bytes 1..=75, the byte is
/// the payload length); `RawData` and `BadOperation` never appear on the
/// wire: the former carries a coinbase payload verbatim, the latter marks
/// bytes the interpreter does not implement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Zero = 0,
    Special = 1,
    Pushdata1 = 76,
    Pushdata2 = 77,
    Pushdata4 = 78,
    Negative1 = 79,
    Reserved = 80,
    Op1 = 81,
    Op2 = 82,
    Op3 = 83,
    Op4 = 84,
    Op5 = 85,
    Op6 = 86,
    Op7 = 87,
    Op8 = 88,
    Op9 = 89,
    Op10 = 90,
    Op11 = 91,
    Op12 = 92,
    Op13 = 93,
    Op14 = 94,
    Op15 = 95,
    Op16 = 96,
    Nop = 97,
    Ver = 98,
    If = 99,
    Notif = 100,
    Verif = 101,
    Vernotif = 102,
    Else = 103,
    Endif = 104,
    Verify = 105,
    Return = 106,
    Toaltstack = 107,
    Fromaltstack = 108,
    Ifdup = 115,
    Depth = 116,
    Drop = 117,
    Dup = 118,
    Nip = 119,
    Over = 120,
    Pick = 121,
    Roll = 122,
    Size = 130,
    Equal = 135,
    Equalverify = 136,
    Reserved1 = 137,
    Reserved2 = 138,
    Not = 145,
    Add = 147,
    Boolor = 155,
    Greaterthanorequal = 162,
    Min = 163,
    Sha256 = 168,
    Hash160 = 169,
    Codeseparator = 171,
    Checksig = 172,
    Checksigverify = 173,
    Checkmultisig = 174,
    Checkmultisigverify = 175,
    Nop1 = 176,
    Nop2 = 177,
    Nop3 = 178,
    Nop4 = 179,
    Nop5 = 180,
    Nop6 = 181,
    Nop7 = 182,
    Nop8 = 183,
    Nop9 = 184,
    Nop10 = 185,
    RawData = 254,
    BadOperation = 255,
}

/// Opcodes barred from execution regardless of branch state.
///
/// Kept as data so a future rule change is a table edit, not a rewrite of
/// the dispatcher. Currently no opcode is disabled.
pub const DISABLED_OPCODES: &[Opcode] = &[];

impl Opcode {
    /// Maps a raw script byte outside the direct-push range to an opcode.
    ///
    /// Bytes in 1..=75 map to `Special`; the parser reads their payload
    /// before this is consulted. Unassigned bytes become `BadOperation`,
    /// which parses fine and fails if executed.
    pub fn from_wire_byte(byte: u8) -> Opcode {
        use Opcode::*;

        match byte {
            0 => Zero,
            1..=75 => Special,
            76 => Pushdata1,
            77 => Pushdata2,
            78 => Pushdata4,
            79 => Negative1,
            80 => Reserved,
            81 => Op1,
            82 => Op2,
            83 => Op3,
            84 => Op4,
            85 => Op5,
            86 => Op6,
            87 => Op7,
            88 => Op8,
            89 => Op9,
            90 => Op10,
            91 => Op11,
            92 => Op12,
            93 => Op13,
            94 => Op14,
            95 => Op15,
            96 => Op16,
            97 => Nop,
            98 => Ver,
            99 => If,
            100 => Notif,
            101 => Verif,
            102 => Vernotif,
            103 => Else,
            104 => Endif,
            105 => Verify,
            106 => Return,
            107 => Toaltstack,
            108 => Fromaltstack,
            115 => Ifdup,
            116 => Depth,
            117 => Drop,
            118 => Dup,
            119 => Nip,
            120 => Over,
            121 => Pick,
            122 => Roll,
            130 => Size,
            135 => Equal,
            136 => Equalverify,
            137 => Reserved1,
            138 => Reserved2,
            145 => Not,
            147 => Add,
            155 => Boolor,
            162 => Greaterthanorequal,
            163 => Min,
            168 => Sha256,
            169 => Hash160,
            171 => Codeseparator,
            172 => Checksig,
            173 => Checksigverify,
            174 => Checkmultisig,
            175 => Checkmultisigverify,
            176 => Nop1,
            177 => Nop2,
            178 => Nop3,
            179 => Nop4,
            180 => Nop5,
            181 => Nop6,
            182 => Nop7,
            183 => Nop8,
            184 => Nop9,
            185 => Nop10,
            _ => BadOperation,
        }
    }

    /// Resolves a mnemonic back to its opcode.
    ///
    /// Unknown mnemonics return `BadOperation`.
    pub fn from_name(name: &str) -> Opcode {
        use Opcode::*;

        match name {
            "zero" => Zero,
            "special" => Special,
            "pushdata1" => Pushdata1,
            "pushdata2" => Pushdata2,
            "pushdata4" => Pushdata4,
            "-1" => Negative1,
            "reserved" => Reserved,
            "1" => Op1,
            "2" => Op2,
            "3" => Op3,
            "4" => Op4,
            "5" => Op5,
            "6" => Op6,
            "7" => Op7,
            "8" => Op8,
            "9" => Op9,
            "10" => Op10,
            "11" => Op11,
            "12" => Op12,
            "13" => Op13,
            "14" => Op14,
            "15" => Op15,
            "16" => Op16,
            "nop" => Nop,
            "ver" => Ver,
            "if" => If,
            "notif" => Notif,
            "verif" => Verif,
            "vernotif" => Vernotif,
            "else" => Else,
            "endif" => Endif,
            "verify" => Verify,
            "return" => Return,
            "toaltstack" => Toaltstack,
            "fromaltstack" => Fromaltstack,
            "ifdup" => Ifdup,
            "depth" => Depth,
            "drop" => Drop,
            "dup" => Dup,
            "nip" => Nip,
            "over" => Over,
            "pick" => Pick,
            "roll" => Roll,
            "size" => Size,
            "equal" => Equal,
            "equalverify" => Equalverify,
            "reserved1" => Reserved1,
            "reserved2" => Reserved2,
            "not" => Not,
            "add" => Add,
            "boolor" => Boolor,
            "greaterthanorequal" => Greaterthanorequal,
            "min" => Min,
            "sha256" => Sha256,
            "hash160" => Hash160,
            "codeseparator" => Codeseparator,
            "checksig" => Checksig,
            "checksigverify" => Checksigverify,
            "checkmultisig" => Checkmultisig,
            "checkmultisigverify" => Checkmultisigverify,
            "op_nop1" => Nop1,
            "op_nop2" => Nop2,
            "op_nop3" => Nop3,
            "op_nop4" => Nop4,
            "op_nop5" => Nop5,
            "op_nop6" => Nop6,
            "op_nop7" => Nop7,
            "op_nop8" => Nop8,
            "op_nop9" => Nop9,
            "op_nop10" => Nop10,
            "raw_data" => RawData,
            _ => BadOperation,
        }
    }

    /// The textual mnemonic for this opcode.
    pub fn name(self) -> &'static str {
        use Opcode::*;

        match self {
            Zero => "zero",
            Special => "special",
            Pushdata1 => "pushdata1",
            Pushdata2 => "pushdata2",
            Pushdata4 => "pushdata4",
            Negative1 => "-1",
            Reserved => "reserved",
            Op1 => "1",
            Op2 => "2",
            Op3 => "3",
            Op4 => "4",
            Op5 => "5",
            Op6 => "6",
            Op7 => "7",
            Op8 => "8",
            Op9 => "9",
            Op10 => "10",
            Op11 => "11",
            Op12 => "12",
            Op13 => "13",
            Op14 => "14",
            Op15 => "15",
            Op16 => "16",
            Nop => "nop",
            Ver => "ver",
            If => "if",
            Notif => "notif",
            Verif => "verif",
            Vernotif => "vernotif",
            Else => "else",
            Endif => "endif",
            Verify => "verify",
            Return => "return",
            Toaltstack => "toaltstack",
            Fromaltstack => "fromaltstack",
            Ifdup => "ifdup",
            Depth => "depth",
            Drop => "drop",
            Dup => "dup",
            Nip => "nip",
            Over => "over",
            Pick => "pick",
            Roll => "roll",
            Size => "size",
            Equal => "equal",
            Equalverify => "equalverify",
            Reserved1 => "reserved1",
            Reserved2 => "reserved2",
            Not => "not",
            Add => "add",
            Boolor => "boolor",
            Greaterthanorequal => "greaterthanorequal",
            Min => "min",
            Sha256 => "sha256",
            Hash160 => "hash160",
            Codeseparator => "codeseparator",
            Checksig => "checksig",
            Checksigverify => "checksigverify",
            Checkmultisig => "checkmultisig",
            Checkmultisigverify => "checkmultisigverify",
            Nop1 => "op_nop1",
            Nop2 => "op_nop2",
            Nop3 => "op_nop3",
            Nop4 => "op_nop4",
            Nop5 => "op_nop5",
            Nop6 => "op_nop6",
            Nop7 => "op_nop7",
            Nop8 => "op_nop8",
            Nop9 => "op_nop9",
            Nop10 => "op_nop10",
            RawData => "raw_data",
            BadOperation => "<none>",
        }
    }

    /// True for every opcode that only places data on the stack.
    pub fn is_push(self) -> bool {
        matches!(
            self,
            Opcode::Zero
                | Opcode::Special
                | Opcode::Pushdata1
                | Opcode::Pushdata2
                | Opcode::Pushdata4
                | Opcode::Negative1
        ) || self.is_op_n()
    }

    /// True for `1`..`16`.
    pub fn is_op_n(self) -> bool {
        let byte = self as u8;
        (Opcode::Op1 as u8..=Opcode::Op16 as u8).contains(&byte)
    }

    /// True for the four branch opcodes, which execute even inside a
    /// failed branch so nesting stays balanced.
    pub fn is_condition(self) -> bool {
        matches!(
            self,
            Opcode::If | Opcode::Notif | Opcode::Else | Opcode::Endif
        )
    }

    /// Consults [`DISABLED_OPCODES`].
    pub fn is_disabled(self) -> bool {
        DISABLED_OPCODES.contains(&self)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
