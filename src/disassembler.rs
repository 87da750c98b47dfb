use crate::analyser::{words, Analysis};
use crate::instruction::Instruction;
use crate::memory::CHIP8_PROGRAM_ADDR;
use std::io;

/// Turns a program into a listing, one line per word:
///
/// ```text
/// 0x0200: 00E0 CLS
/// ```
///
/// Terse mode prints the usual mnemonics; verbose mode spells each one out in
/// English. Anything that doesn't decode to a known instruction is printed as
/// `???`, since it's probably data.
pub struct Disassembler {
    pub verbose: bool,
}

impl Disassembler {
    pub fn new(verbose: bool) -> Self {
        Disassembler { verbose }
    }

    /// write the whole listing, with `loc_`/`sub_` labels on jump and call
    /// targets found by the analyser
    pub fn write_listing(
        &self,
        out: &mut impl io::Write,
        name: &str,
        buffer: &[u8],
        analysis: &Analysis,
    ) -> io::Result<()> {
        writeln!(out, "{}, {} bytes long", name, buffer.len())?;
        writeln!(out)?;
        for (offset, instr) in words(buffer) {
            let addr = CHIP8_PROGRAM_ADDR as usize + offset;
            if let Ok(addr) = u16::try_from(addr) {
                if analysis.is_call_target(addr) {
                    writeln!(out, "sub_{:04X}:", addr)?;
                } else if analysis.is_jump_target(addr) {
                    writeln!(out, "loc_{:04X}:", addr)?;
                }
            }
            writeln!(out, "{}", self.line(addr, instr))?;
        }
        Ok(())
    }

    pub fn line(&self, addr: usize, instr: Instruction) -> String {
        format!("0x{:04X}: {:04X} {}", addr, instr.word(), self.describe(instr))
    }

    pub fn describe(&self, instr: Instruction) -> String {
        if self.verbose {
            verbose(instr)
        } else {
            terse(instr)
        }
    }
}

fn terse(i: Instruction) -> String {
    let (x, y, n, nn, nnn) = (i.x(), i.y(), i.n(), i.nn(), i.nnn());
    match i.family() {
        0x0 => match nn {
            0xe0 => "CLS".to_string(),
            0xee => "RET".to_string(),
            _ => format!("SYS {:04X}", nnn),
        },
        0x1 => format!("JP {:04X}", nnn),
        0x2 => format!("CALL {:04X}", nnn),
        0x3 => format!("SE V{:X}, {:X}", x, nn),
        0x4 => format!("SNE V{:X}, {:X}", x, nn),
        0x5 => format!("SE V{:X}, V{:X}", x, y),
        0x6 => format!("LD V{:X}, {:X}", x, nn),
        0x7 => format!("ADD V{:X}, {:X}", x, nn),
        0x8 => {
            let op = match n {
                0x0 => "LD",
                0x1 => "OR",
                0x2 => "AND",
                0x3 => "XOR",
                0x4 => "ADD",
                0x5 => "SUB",
                0x6 => "SHR",
                0x7 => "SUBN",
                0xe => "SHL",
                _ => return "???".to_string(),
            };
            format!("{} V{:X}, V{:X}", op, x, y)
        }
        0x9 => format!("SNE V{:X}, V{:X}", x, y),
        0xa => format!("LD I, {:04X}", nnn),
        0xb => format!("JP V0, {:04X}", nnn),
        0xc => format!("RND V{:X}, {:X}", x, nn),
        0xd => format!("DRW V{:X}, V{:X}, {:X}", x, y, n),
        0xe => match nn {
            0x9e => format!("SKP V{:X}", x),
            0xa1 => format!("SKNP V{:X}", x),
            _ => "???".to_string(),
        },
        _ => match nn {
            0x07 => format!("LD V{:X}, DT", x),
            0x0a => format!("LD V{:X}, K", x),
            0x15 => format!("LD DT, V{:X}", x),
            0x18 => format!("LD ST, V{:X}", x),
            0x1e => format!("ADD I, V{:X}", x),
            0x29 => format!("LD F, V{:X}", x),
            0x33 => format!("LD B, V{:X}", x),
            0x55 => format!("LD [I], V{:X}", x),
            0x65 => format!("LD V{:X}, [I]", x),
            _ => "???".to_string(),
        },
    }
}

const UNKNOWN: &str = "Unknown instruction (might be data)";

fn verbose(i: Instruction) -> String {
    let (x, y, n, nn, nnn) = (i.x(), i.y(), i.n(), i.nn(), i.nnn());
    match i.family() {
        0x0 => match nn {
            0xe0 => "Clear the screen".to_string(),
            0xee => "Return from subroutine".to_string(),
            _ => format!("Run machine code @ {:04X} (might be data)", nnn),
        },
        0x1 => format!("Jump to {:04X}", nnn),
        0x2 => format!("Call subroutine @ {:04X}", nnn),
        0x3 => format!("Skip next if V{:X} == {:X}", x, nn),
        0x4 => format!("Skip next if V{:X} != {:X}", x, nn),
        0x5 => format!("Skip next if V{:X} == V{:X}", x, y),
        0x6 => format!("Set V{:X} to {:X}", x, nn),
        0x7 => format!("Add {:X} to V{:X}", nn, x),
        0x8 => match n {
            0x0 => format!("Set V{:X} to V{:X}", x, y),
            0x1 => format!("OR V{:X} with V{:X}", x, y),
            0x2 => format!("AND V{:X} with V{:X}", x, y),
            0x3 => format!("XOR V{:X} with V{:X}", x, y),
            0x4 => format!("Add V{:X} to V{:X}", y, x),
            0x5 => format!("Subtract V{:X} from V{:X}", y, x),
            0x6 => format!("Set V{:X} to V{:X} >> 1", x, y),
            0x7 => format!("Subtract V{:X} from V{:X}, store in V{:X}", x, y, x),
            0xe => format!("Set V{:X} to V{:X} << 1", x, y),
            _ => UNKNOWN.to_string(),
        },
        0x9 => format!("Skip next if V{:X} != V{:X}", x, y),
        0xa => format!("Set I to {:04X}", nnn),
        0xb => format!("Jump to V0 + {:04X}", nnn),
        0xc => format!("Set V{:X} to random byte w/ mask {:X}", x, nn),
        0xd => format!("Draw {:X}-byte long sprite to (V{:X}, V{:X})", n, x, y),
        0xe => match nn {
            0x9e => format!("Skip next if key V{:X} is pressed", x),
            0xa1 => format!("Skip next if key V{:X} is not pressed", x),
            _ => UNKNOWN.to_string(),
        },
        _ => match nn {
            0x07 => format!("Load delay timer into V{:X}", x),
            0x0a => format!("Wait for key, store in V{:X}", x),
            0x15 => format!("Set delay timer to V{:X}", x),
            0x18 => format!("Set sound timer to V{:X}", x),
            0x1e => format!("Add V{:X} to I", x),
            0x29 => format!("Load digit V{:X} address into I", x),
            0x33 => format!("Store BCD of V{:X} into I...I+2", x),
            0x55 => format!("Store V0...V{:X} starting at I", x),
            0x65 => format!("Read V0...V{:X} starting at I", x),
            _ => UNKNOWN.to_string(),
        },
    }
}
