//! Opcode constants for both instruction sets: the source stack machine
//! (CIL subset) and the target VM.

/// Source instruction set. Operands noted per opcode; multi-byte operands
/// are little-endian, as the source format encodes them.
pub mod il {
    pub const NOP: u8 = 0x00;
    pub const BREAK: u8 = 0x01;
    pub const LDARG_0: u8 = 0x02;
    pub const LDARG_3: u8 = 0x05;
    pub const LDLOC_0: u8 = 0x06;
    pub const LDLOC_3: u8 = 0x09;
    pub const STLOC_0: u8 = 0x0A;
    pub const STLOC_3: u8 = 0x0D;
    pub const LDARG_S: u8 = 0x0E; // <u8 arg index>
    pub const LDLOC_S: u8 = 0x11; // <u8 local index>
    pub const STLOC_S: u8 = 0x13; // <u8 local index>
    pub const LDC_R4: u8 = 0x22; // <f32>
    pub const DUP: u8 = 0x25;
    pub const POP: u8 = 0x26;
    pub const CALL: u8 = 0x28; // <u32 token>
    pub const RET: u8 = 0x2A;
    pub const BR_S: u8 = 0x2B; // <i8 offset>
    pub const ADD: u8 = 0x58;
    pub const CONV_I4: u8 = 0x69;
    pub const CALLVIRT: u8 = 0x6F; // <u32 token>
    pub const LDSTR: u8 = 0x72; // <u32 token>
    pub const NEWOBJ: u8 = 0x73; // <u32 token>
    pub const LDFLD: u8 = 0x7B; // <u32 token>
    pub const STFLD: u8 = 0x7D; // <u32 token>
    pub const LDSFLD: u8 = 0x7E; // <u32 token>
    pub const STSFLD: u8 = 0x80; // <u32 token>
    pub const BOX: u8 = 0x8C; // <u32 token>
    pub const NEWARR: u8 = 0x8D; // <u32 token>
    pub const STELEM_REF: u8 = 0xA2;
    pub const LDTOKEN: u8 = 0xD0; // <u32 token>
}

/// Target instruction set. All multi-byte operands are big-endian.
pub mod jvm {
    pub const NOP: u8 = 0x00;
    pub const LDC: u8 = 0x12; // <u8 pool index>
    pub const LDC_W: u8 = 0x13; // <u16 pool index>

    // Explicit-index load/store forms, one-byte slot operand.
    pub const ILOAD: u8 = 0x15;
    pub const LLOAD: u8 = 0x16;
    pub const FLOAD: u8 = 0x17;
    pub const DLOAD: u8 = 0x18;
    pub const ALOAD: u8 = 0x19;
    pub const ISTORE: u8 = 0x36;
    pub const LSTORE: u8 = 0x37;
    pub const FSTORE: u8 = 0x38;
    pub const DSTORE: u8 = 0x39;
    pub const ASTORE: u8 = 0x3A;

    // Implicit-index bases: base + slot for slots 0..=3.
    pub const ILOAD_0: u8 = 0x1A;
    pub const LLOAD_0: u8 = 0x1E;
    pub const FLOAD_0: u8 = 0x22;
    pub const DLOAD_0: u8 = 0x26;
    pub const ALOAD_0: u8 = 0x2A;
    pub const ISTORE_0: u8 = 0x3B;
    pub const LSTORE_0: u8 = 0x3F;
    pub const FSTORE_0: u8 = 0x43;
    pub const DSTORE_0: u8 = 0x47;
    pub const ASTORE_0: u8 = 0x4B;

    pub const AASTORE: u8 = 0x53;
    pub const POP: u8 = 0x57;
    pub const DUP: u8 = 0x59;

    pub const IADD: u8 = 0x60;
    pub const LADD: u8 = 0x61;
    pub const FADD: u8 = 0x62;
    pub const DADD: u8 = 0x63;

    pub const L2I: u8 = 0x88;
    pub const F2I: u8 = 0x8B;
    pub const D2I: u8 = 0x8E;

    pub const GOTO: u8 = 0xA7; // <i16 offset>

    pub const IRETURN: u8 = 0xAC;
    pub const LRETURN: u8 = 0xAD;
    pub const FRETURN: u8 = 0xAE;
    pub const DRETURN: u8 = 0xAF;
    pub const ARETURN: u8 = 0xB0;
    pub const RETURN: u8 = 0xB1;

    pub const GETSTATIC: u8 = 0xB2; // <u16 pool index>
    pub const PUTSTATIC: u8 = 0xB3;
    pub const GETFIELD: u8 = 0xB4;
    pub const PUTFIELD: u8 = 0xB5;

    pub const INVOKEVIRTUAL: u8 = 0xB6; // <u16 pool index>
    pub const INVOKESPECIAL: u8 = 0xB7;
    pub const INVOKESTATIC: u8 = 0xB8;
    pub const INVOKEINTERFACE: u8 = 0xB9; // <u16 pool index> <u8 count> <0>

    pub const NEW: u8 = 0xBB; // <u16 pool index>
    pub const NEWARRAY: u8 = 0xBC; // <u8 atype>
    pub const ANEWARRAY: u8 = 0xBD; // <u16 pool index>

    pub const BREAKPOINT: u8 = 0xCA;

    // newarray element type codes.
    pub const ATYPE_BOOLEAN: u8 = 4;
    pub const ATYPE_CHAR: u8 = 5;
    pub const ATYPE_FLOAT: u8 = 6;
    pub const ATYPE_DOUBLE: u8 = 7;
    pub const ATYPE_BYTE: u8 = 8;
    pub const ATYPE_SHORT: u8 = 9;
    pub const ATYPE_INT: u8 = 10;
    pub const ATYPE_LONG: u8 = 11;
}
