//! # Instruction Encoder
//!
//! Typed encoding of Hack instructions into 16-bit words.
//!
//! ## Instruction Shapes
//!
//! - *A-instruction*: `0` followed by a 15-bit unsigned address.
//! - *C-instruction*: `111` (ALU) or `101` (shift extension), then a 7-bit
//!   `comp` field, a 3-bit `dest` mask and a 3-bit `jump` selector.
//!
//! The mnemonic tables are closed: [`Comp`] is an exhaustive enum, [`Dest`]
//! is an order-independent bit mask, [`Jump`] selects one of eight
//! conditions. Impossible mnemonic combinations are unrepresentable.

use bitflags::bitflags;

/// Prefix of a standard ALU C-instruction.
const C_PREFIX: u16 = 0b111;
/// Prefix of a C-instruction whose comp uses the shift extension.
const SHIFT_PREFIX: u16 = 0b101;

bitflags! {
    /// The `dest` field: any subset of the `A`, `D` and `M` registers.
    ///
    /// The mask is order-independent; `AMD`, `MAD` and `DMA` all encode the
    /// same three bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Dest: u16 {
        const A = 0b100;
        const D = 0b010;
        const M = 0b001;
    }
}

impl Dest {
    /// Parse a dest mnemonic: any permutation of `A`/`D`/`M`, the literal
    /// word `null`, or the empty string.
    pub fn parse(mnemonic: &str) -> Option<Dest> {
        if mnemonic.is_empty() || mnemonic == "null" {
            return Some(Dest::empty());
        }
        let mut mask = Dest::empty();
        for ch in mnemonic.chars() {
            let bit = match ch {
                'A' => Dest::A,
                'D' => Dest::D,
                'M' => Dest::M,
                _ => return None,
            };
            if mask.contains(bit) {
                return None;
            }
            mask |= bit;
        }
        Some(mask)
    }
}

/// The `comp` field: the closed set of ALU computations, including the six
/// shift mnemonics of the CPU's shift extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,
    DShiftLeft,
    AShiftLeft,
    MShiftLeft,
    DShiftRight,
    AShiftRight,
    MShiftRight,
}

impl Comp {
    /// Parse a comp mnemonic. Commutative operands may be written in either
    /// order (`A+D` is `D+A`); everything else is matched verbatim.
    pub fn parse(mnemonic: &str) -> Option<Comp> {
        use Comp::*;
        let comp = match mnemonic {
            "0" => Zero,
            "1" => One,
            "-1" => NegOne,
            "D" => D,
            "A" => A,
            "!D" => NotD,
            "!A" => NotA,
            "-D" => NegD,
            "-A" => NegA,
            "D+1" => DPlusOne,
            "A+1" => APlusOne,
            "D-1" => DMinusOne,
            "A-1" => AMinusOne,
            "D+A" | "A+D" => DPlusA,
            "D-A" => DMinusA,
            "A-D" => AMinusD,
            "D&A" | "A&D" => DAndA,
            "D|A" | "A|D" => DOrA,
            "M" => M,
            "!M" => NotM,
            "-M" => NegM,
            "M+1" => MPlusOne,
            "M-1" => MMinusOne,
            "D+M" | "M+D" => DPlusM,
            "D-M" => DMinusM,
            "M-D" => MMinusD,
            "D&M" | "M&D" => DAndM,
            "D|M" | "M|D" => DOrM,
            "D<<" => DShiftLeft,
            "A<<" => AShiftLeft,
            "M<<" => MShiftLeft,
            "D>>" => DShiftRight,
            "A>>" => AShiftRight,
            "M>>" => MShiftRight,
            _ => return None,
        };
        Some(comp)
    }

    /// The 7-bit comp field (a-bit plus six c-bits).
    pub fn bits(self) -> u16 {
        use Comp::*;
        match self {
            Zero => 0b0101010,
            One => 0b0111111,
            NegOne => 0b0111010,
            D => 0b0001100,
            A => 0b0110000,
            NotD => 0b0001101,
            NotA => 0b0110001,
            NegD => 0b0001111,
            NegA => 0b0110011,
            DPlusOne => 0b0011111,
            APlusOne => 0b0110111,
            DMinusOne => 0b0001110,
            AMinusOne => 0b0110010,
            DPlusA => 0b0000010,
            DMinusA => 0b0010011,
            AMinusD => 0b0000111,
            DAndA => 0b0000000,
            DOrA => 0b0010101,
            M => 0b1110000,
            NotM => 0b1110001,
            NegM => 0b1110011,
            MPlusOne => 0b1110111,
            MMinusOne => 0b1110010,
            DPlusM => 0b1000010,
            DMinusM => 0b1010011,
            MMinusD => 0b1000111,
            DAndM => 0b1000000,
            DOrM => 0b1010101,
            DShiftLeft => 0b0110000,
            AShiftLeft => 0b0100000,
            MShiftLeft => 0b1100000,
            DShiftRight => 0b0010000,
            AShiftRight => 0b0000000,
            MShiftRight => 0b1000000,
        }
    }

    /// Shift mnemonics promote the instruction prefix from `111` to `101`.
    pub fn is_shift(self) -> bool {
        use Comp::*;
        matches!(
            self,
            DShiftLeft | AShiftLeft | MShiftLeft | DShiftRight | AShiftRight | MShiftRight
        )
    }
}

/// The `jump` field: one of the eight branch conditions on the ALU output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Null,
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    /// Parse a jump mnemonic; `null`, the empty string and a bare trailing
    /// semicolon all mean "no jump".
    pub fn parse(mnemonic: &str) -> Option<Jump> {
        let jump = match mnemonic {
            "" | "null" => Jump::Null,
            "JGT" => Jump::Jgt,
            "JEQ" => Jump::Jeq,
            "JGE" => Jump::Jge,
            "JLT" => Jump::Jlt,
            "JNE" => Jump::Jne,
            "JLE" => Jump::Jle,
            "JMP" => Jump::Jmp,
            _ => return None,
        };
        Some(jump)
    }

    pub fn bits(self) -> u16 {
        self as u16
    }
}

/// Encode an A-instruction. The address is the caller's responsibility to
/// keep in 15 bits; the leading bit is forced to zero.
pub fn encode_a(address: u16) -> u16 {
    address & 0x7FFF
}

/// Encode a C-instruction, selecting the `101` prefix for shift comps.
pub fn encode_c(dest: Dest, comp: Comp, jump: Jump) -> u16 {
    let prefix = if comp.is_shift() {
        SHIFT_PREFIX
    } else {
        C_PREFIX
    };
    (prefix << 13) | (comp.bits() << 6) | (dest.bits() << 3) | jump.bits()
}
