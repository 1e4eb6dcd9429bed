//! Deduplicating constant-pool builder.
//!
//! One pool is built per class during translation and frozen at
//! serialization time. Entries are appended depth-first (children before
//! parents) so every composite entry's child indices are already valid,
//! and structurally equal entries always intern to the same 1-based index.

use std::collections::HashMap;

use crate::constant_info::{
    ClassConstant, ConstantInfo, FieldRefConstant, FloatConstant, InterfaceMethodRefConstant,
    MethodRefConstant, NameAndTypeConstant, StringConstant, Utf8Constant,
};

/// Canonical hash key for one pool entry. Floats are keyed by raw bits so
/// structural equality is exact rather than IEEE comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Float(u32),
    Class(u16),
    Str(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantInfo>,
    index: HashMap<PoolKey, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool::default()
    }

    /// Number of entries actually present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pool count as the class format declares it: entries + 1.
    pub fn count(&self) -> u16 {
        self.entries.len() as u16 + 1
    }

    pub fn entries(&self) -> &[ConstantInfo] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ConstantInfo> {
        self.entries
    }

    fn add(&mut self, key: PoolKey, entry: ConstantInfo) -> u16 {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        self.entries.push(entry);
        let idx = self.entries.len() as u16;
        self.index.insert(key, idx);
        idx
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.add(
            PoolKey::Utf8(text.to_string()),
            ConstantInfo::Utf8(Utf8Constant::from_str(text)),
        )
    }

    pub fn float(&mut self, value: f32) -> u16 {
        self.add(
            PoolKey::Float(value.to_bits()),
            ConstantInfo::Float(FloatConstant { value }),
        )
    }

    /// Intern a class reference by its slash-delimited internal name.
    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.add(
            PoolKey::Class(name_index),
            ConstantInfo::Class(ClassConstant { name_index }),
        )
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let string_index = self.utf8(text);
        self.add(
            PoolKey::Str(string_index),
            ConstantInfo::String(StringConstant { string_index }),
        )
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.add(
            PoolKey::NameAndType(name_index, descriptor_index),
            ConstantInfo::NameAndType(NameAndTypeConstant {
                name_index,
                descriptor_index,
            }),
        )
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.add(
            PoolKey::FieldRef(class_index, name_and_type_index),
            ConstantInfo::FieldRef(FieldRefConstant {
                class_index,
                name_and_type_index,
            }),
        )
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.add(
            PoolKey::MethodRef(class_index, name_and_type_index),
            ConstantInfo::MethodRef(MethodRefConstant {
                class_index,
                name_and_type_index,
            }),
        )
    }

    pub fn interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.add(
            PoolKey::InterfaceMethodRef(class_index, name_and_type_index),
            ConstantInfo::InterfaceMethodRef(InterfaceMethodRefConstant {
                class_index,
                name_and_type_index,
            }),
        )
    }
}
