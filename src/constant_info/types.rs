use binrw::binrw;

/// The constant-pool entry kinds this crate emits. Each variant carries its
/// format-defined tag byte as a binrw magic so entries round-trip through
/// read as well as write.
#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub enum ConstantInfo {
    #[brw(magic = 1u8)]
    Utf8(Utf8Constant),
    #[brw(magic = 4u8)]
    Float(FloatConstant),
    #[brw(magic = 7u8)]
    Class(ClassConstant),
    #[brw(magic = 8u8)]
    String(StringConstant),
    #[brw(magic = 9u8)]
    FieldRef(FieldRefConstant),
    #[brw(magic = 10u8)]
    MethodRef(MethodRefConstant),
    #[brw(magic = 11u8)]
    InterfaceMethodRef(InterfaceMethodRefConstant),
    #[brw(magic = 12u8)]
    NameAndType(NameAndTypeConstant),
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct Utf8Constant {
    pub length: u16,
    #[br(count = length)]
    pub bytes: Vec<u8>,
}

impl Utf8Constant {
    /// Encode a string in the format's modified UTF-8: embedded NULs are
    /// written as the two-byte sequence 0xC0 0x80.
    pub fn from_str(s: &str) -> Self {
        let mut bytes = Vec::with_capacity(s.len());
        for b in s.bytes() {
            if b == 0 {
                bytes.push(0xC0);
                bytes.push(0x80);
            } else {
                bytes.push(b);
            }
        }
        Utf8Constant {
            length: bytes.len() as u16,
            bytes,
        }
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct FloatConstant {
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct ClassConstant {
    pub name_index: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct StringConstant {
    pub string_index: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct FieldRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct MethodRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct InterfaceMethodRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct NameAndTypeConstant {
    pub name_index: u16,
    pub descriptor_index: u16,
}
