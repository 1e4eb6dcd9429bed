//! Assembles one complete class file per input descriptor: a fresh constant
//! pool, field and method tables, translated method bodies wrapped in
//! `Code` attributes, and the serialized big-endian output.

use crate::attribute_info::CodeAttribute;
use crate::constant_pool::ConstantPool;
use crate::descriptor::{
    method_descriptor, ClassDescriptor, FieldDescriptor, MethodDescriptor, Visibility,
};
use crate::error::BuildError;
use crate::field_info::{FieldAccessFlags, FieldInfo};
use crate::mappings::SymbolResolver;
use crate::method_info::{MethodAccessFlags, MethodInfo};
use crate::translate::{opcodes::jvm, translate_method, TranslateOptions};
use crate::types::{ClassAccessFlags, ClassFile, MAJOR_VERSION};

/// A finished class: its slash-delimited target name (which decides the
/// archive entry path) and the serialized class file.
#[derive(Clone, Debug)]
pub struct EmittedClass {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct ClassEmitter<'a> {
    resolver: &'a SymbolResolver,
    options: TranslateOptions,
}

impl<'a> ClassEmitter<'a> {
    pub fn new(resolver: &'a SymbolResolver) -> Self {
        ClassEmitter {
            resolver,
            options: TranslateOptions::default(),
        }
    }

    pub fn with_options(resolver: &'a SymbolResolver, options: TranslateOptions) -> Self {
        ClassEmitter { resolver, options }
    }

    /// Emit one class. Builds the constant pool and method bodies in one
    /// pass, then serializes; nothing is written on error.
    pub fn emit(&self, class: &ClassDescriptor) -> Result<EmittedClass, BuildError> {
        let mut pool = ConstantPool::new();

        let name = self.resolver.resolve_class(&class.name)?;
        let super_name = self.resolver.resolve_class(&class.super_class)?;
        let this_class = pool.class(&name);
        let super_class = pool.class(&super_name);

        let mut interfaces = Vec::with_capacity(class.interfaces.len());
        for path in &class.interfaces {
            let resolved = self.resolver.resolve_class(path)?;
            interfaces.push(pool.class(&resolved));
        }

        let mut fields = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            fields.push(self.emit_field(&mut pool, field)?);
        }

        let mut methods = Vec::with_capacity(class.methods.len() + 1);
        for method in &class.methods {
            methods.push(self.emit_method(&mut pool, class, method)?);
        }
        let has_constructor = class.methods.iter().any(MethodDescriptor::is_constructor);
        if !class.is_interface && !has_constructor {
            methods.push(default_constructor(&mut pool, &super_name)?);
        }

        let access_flags = if class.is_interface {
            ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT
        } else {
            ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER
        };

        let class_file = ClassFile {
            minor_version: 0,
            major_version: MAJOR_VERSION,
            const_pool_size: pool.count(),
            const_pool: pool.into_entries(),
            access_flags,
            this_class,
            super_class,
            interfaces_count: interfaces.len() as u16,
            interfaces,
            fields_count: fields.len() as u16,
            fields,
            methods_count: methods.len() as u16,
            methods,
            attributes_count: 0,
            attributes: Vec::new(),
        };
        Ok(EmittedClass {
            name,
            bytes: class_file.to_bytes()?,
        })
    }

    fn emit_field(
        &self,
        pool: &mut ConstantPool,
        field: &FieldDescriptor,
    ) -> Result<FieldInfo, BuildError> {
        let mut flags = match field.visibility {
            Visibility::Public => FieldAccessFlags::PUBLIC,
            Visibility::Protected => FieldAccessFlags::PROTECTED,
            Visibility::Private => FieldAccessFlags::PRIVATE,
        };
        if field.is_static {
            flags |= FieldAccessFlags::STATIC;
        }
        if field.is_final {
            flags |= FieldAccessFlags::FINAL;
        }
        let name_index = pool.utf8(&field.name);
        let descriptor = field.ty.descriptor(self.resolver)?;
        let descriptor_index = pool.utf8(&descriptor);
        Ok(FieldInfo {
            access_flags: flags,
            name_index,
            descriptor_index,
            attributes_count: 0,
            attributes: Vec::new(),
        })
    }

    fn emit_method(
        &self,
        pool: &mut ConstantPool,
        class: &ClassDescriptor,
        method: &MethodDescriptor,
    ) -> Result<MethodInfo, BuildError> {
        let mut flags = match method.visibility {
            Visibility::Public => MethodAccessFlags::PUBLIC,
            Visibility::Protected => MethodAccessFlags::PROTECTED,
            Visibility::Private => MethodAccessFlags::PRIVATE,
        };
        if method.is_static {
            flags |= MethodAccessFlags::STATIC;
        }
        if method.is_abstract {
            flags |= MethodAccessFlags::ABSTRACT;
        }

        let name_index = pool.utf8(&method.name);
        let descriptor = method_descriptor(&method.params, &method.ret, self.resolver)?;
        let descriptor_index = pool.utf8(&descriptor);

        let attributes = if method.is_abstract {
            Vec::new()
        } else {
            let body = translate_method(pool, self.resolver, &class.name, method, &self.options)?;
            let code_name = pool.utf8("Code");
            vec![CodeAttribute::new(body.max_stack, body.max_locals, body.code)
                .into_attribute(code_name)?]
        };
        Ok(MethodInfo {
            access_flags: flags,
            name_index,
            descriptor_index,
            attributes_count: attributes.len() as u16,
            attributes,
        })
    }
}

/// Synthesized public no-argument constructor: load the receiver, invoke
/// the superclass constructor, return.
fn default_constructor(
    pool: &mut ConstantPool,
    super_name: &str,
) -> Result<MethodInfo, BuildError> {
    let init_ref = pool.method_ref(super_name, "<init>", "()V");
    let mut code = vec![jvm::ALOAD_0, jvm::INVOKESPECIAL];
    code.extend_from_slice(&init_ref.to_be_bytes());
    code.push(jvm::RETURN);

    let name_index = pool.utf8("<init>");
    let descriptor_index = pool.utf8("()V");
    let code_name = pool.utf8("Code");
    let attribute = CodeAttribute::new(1, 1, code).into_attribute(code_name)?;
    Ok(MethodInfo {
        access_flags: MethodAccessFlags::PUBLIC,
        name_index,
        descriptor_index,
        attributes_count: 1,
        attributes: vec![attribute],
    })
}
