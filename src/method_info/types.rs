use crate::attribute_info::AttributeInfo;

use binrw::binrw;

#[derive(Clone, Debug)]
#[binrw]
#[brw(big)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes_count: u16,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[binrw]
pub struct MethodAccessFlags(u16);

bitflags! {
    impl MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;    // Declared public; may be accessed from outside its package.
        const PRIVATE = 0x0002;   // Declared private; usable only within the defining class.
        const PROTECTED = 0x0004; // Declared protected; may be accessed within subclasses.
        const STATIC = 0x0008;    // Declared static.
        const FINAL = 0x0010;     // Declared final; must not be overridden.
        const ABSTRACT = 0x0400;  // Declared abstract; no implementation is provided.
        const SYNTHETIC = 0x1000; // Declared synthetic; not present in the source code.
    }
}
