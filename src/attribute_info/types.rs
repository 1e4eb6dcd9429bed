use binrw::binrw;

/// Raw attribute envelope: name index, byte length, opaque payload.
#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct AttributeInfo {
    pub attribute_name_index: u16,
    pub attribute_length: u32,
    #[br(count = attribute_length)]
    pub info: Vec<u8>,
}

/// Payload of a `Code` attribute as this crate emits it: no exception
/// table entries and no nested attributes.
#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code_length: u32,
    #[br(count = code_length)]
    pub code: Vec<u8>,
    pub exception_table_length: u16,
    pub attributes_count: u16,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        CodeAttribute {
            max_stack,
            max_locals,
            code_length: code.len() as u32,
            code,
            exception_table_length: 0,
            attributes_count: 0,
        }
    }

    /// Wrap the payload in an attribute envelope. `name_index` must point
    /// at a `Code` UTF-8 pool entry.
    pub fn into_attribute(self, name_index: u16) -> Result<AttributeInfo, binrw::Error> {
        use binrw::BinWrite;
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        let info = cursor.into_inner();
        Ok(AttributeInfo {
            attribute_name_index: name_index,
            attribute_length: info.len() as u32,
            info,
        })
    }

    /// Parse a `Code` payload back out of an attribute envelope.
    pub fn from_attribute(attr: &AttributeInfo) -> Result<Self, binrw::Error> {
        use binrw::BinRead;
        let mut cursor = std::io::Cursor::new(&attr.info);
        Self::read(&mut cursor)
    }
}
