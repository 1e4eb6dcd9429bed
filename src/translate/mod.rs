//! The per-method instruction translator.
//!
//! One left-to-right pass over the source instruction stream, keeping an
//! operand-type stack so type-specific target opcodes can be selected, and
//! a checkpoint list so object-construction sequences can be patched into
//! already-emitted output (the target format's allocate-then-initialize
//! protocol has no counterpart in the source representation).

pub mod opcodes;

use tracing::warn;

use crate::constant_pool::ConstantPool;
use crate::descriptor::{method_descriptor, MethodDescriptor, Token, ValueType};
use crate::error::BuildError;
use crate::mappings::SymbolResolver;

use self::opcodes::{il, jvm};

#[derive(Clone, Debug, Default)]
pub struct TranslateOptions {
    /// Drop unrecognized source instructions with a warning instead of
    /// failing. Best-effort compatibility mode: a dropped instruction can
    /// silently desynchronize the simulated operand stack for the rest of
    /// the method; off by default.
    pub lenient_unknown_instructions: bool,
}

/// The translated form of one method body.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedMethodBody {
    pub code: Vec<u8>,
    pub max_stack: u16,
    pub max_locals: u16,
}

/// Records where a pushed value's producing instruction begins in the
/// output and how deep the value stack was just before the push. Consulted
/// when a construction sequence must be inserted before already-emitted
/// argument producers.
struct Checkpoint {
    offset: usize,
    depth_before: usize,
}

/// Translate one method's instruction stream. `class_name` is the
/// dot-delimited internal name of the declaring class.
pub fn translate_method(
    pool: &mut ConstantPool,
    resolver: &SymbolResolver,
    class_name: &str,
    method: &MethodDescriptor,
    options: &TranslateOptions,
) -> Result<TranslatedMethodBody, BuildError> {
    let code = method
        .code
        .as_deref()
        .ok_or_else(|| BuildError::MissingInstructionBody {
            class: class_name.to_string(),
            method: method.name.clone(),
        })?;
    let mut translator = Translator::new(pool, resolver, class_name, method, options);
    translator.run(code)?;
    Ok(translator.finish())
}

struct Translator<'a> {
    pool: &'a mut ConstantPool,
    resolver: &'a SymbolResolver,
    class_name: &'a str,
    method: &'a MethodDescriptor,
    options: &'a TranslateOptions,
    /// Simulated operand stack of inferred value types.
    stack: Vec<ValueType>,
    /// Live stack depth in target slots (long/double take two).
    slot_depth: u16,
    max_stack: u16,
    /// Inferred type per local slot: receiver, then parameters, then locals.
    locals: Vec<Option<ValueType>>,
    checkpoints: Vec<Checkpoint>,
    out: Vec<u8>,
}

impl<'a> Translator<'a> {
    fn new(
        pool: &'a mut ConstantPool,
        resolver: &'a SymbolResolver,
        class_name: &'a str,
        method: &'a MethodDescriptor,
        options: &'a TranslateOptions,
    ) -> Self {
        let mut locals = vec![None; 1 + method.params.len() + method.local_count as usize];
        if !method.is_static {
            locals[0] = Some(ValueType::Object(class_name.to_string()));
        }
        let base = if method.is_static { 0 } else { 1 };
        for (i, param) in method.params.iter().enumerate() {
            locals[base + i] = Some(param.clone());
        }
        Translator {
            pool,
            resolver,
            class_name,
            method,
            options,
            stack: Vec::new(),
            slot_depth: 0,
            max_stack: 0,
            locals,
            checkpoints: Vec::new(),
            out: Vec::new(),
        }
    }

    fn finish(self) -> TranslatedMethodBody {
        TranslatedMethodBody {
            code: self.out,
            max_stack: self.max_stack,
            max_locals: self.locals.len() as u16,
        }
    }

    // --- Error helpers ---

    fn malformed(&self, offset: usize, message: impl Into<String>) -> BuildError {
        BuildError::MalformedInstruction {
            class: self.class_name.to_string(),
            method: self.method.name.clone(),
            offset,
            message: message.into(),
        }
    }

    // --- Stack simulation ---

    fn push(&mut self, ty: ValueType) {
        self.slot_depth += ty.slot_width();
        if self.slot_depth > self.max_stack {
            self.max_stack = self.slot_depth;
        }
        self.stack.push(ty);
    }

    /// Push a type and record a checkpoint for the instruction starting at
    /// output offset `at`.
    fn push_tracked(&mut self, at: usize, ty: ValueType) {
        self.checkpoints.push(Checkpoint {
            offset: at,
            depth_before: self.stack.len(),
        });
        self.push(ty);
    }

    fn pop(&mut self, offset: usize) -> Result<ValueType, BuildError> {
        match self.stack.pop() {
            Some(ty) => {
                self.slot_depth -= ty.slot_width();
                Ok(ty)
            }
            None => Err(self.malformed(offset, "operand stack underflow")),
        }
    }

    // --- Operand reading ---

    fn take<const N: usize>(
        &self,
        code: &[u8],
        pos: usize,
        offset: usize,
    ) -> Result<[u8; N], BuildError> {
        code.get(pos..pos + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| self.malformed(offset, "operand runs past end of instruction stream"))
    }

    fn token(&self, index: u32, offset: usize) -> Result<Token, BuildError> {
        self.method
            .tokens
            .get(index as usize)
            .cloned()
            .ok_or_else(|| self.malformed(offset, format!("token index {index} out of range")))
    }

    // --- Emission helpers ---

    fn emit(&mut self, byte: u8) {
        self.out.push(byte);
    }

    fn emit_u16(&mut self, value: u16) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    fn emit_ldc(&mut self, index: u16) {
        if index <= u8::MAX as u16 {
            self.emit(jvm::LDC);
            self.emit(index as u8);
        } else {
            self.emit(jvm::LDC_W);
            self.emit_u16(index);
        }
    }

    /// (implicit-index base opcode, explicit-index opcode) pair for loads.
    fn load_family(&self, ty: &ValueType, offset: usize) -> Result<(u8, u8), BuildError> {
        Ok(match ty {
            ValueType::Int
            | ValueType::Byte
            | ValueType::Short
            | ValueType::Char
            | ValueType::Boolean => (jvm::ILOAD_0, jvm::ILOAD),
            ValueType::Long => (jvm::LLOAD_0, jvm::LLOAD),
            ValueType::Float => (jvm::FLOAD_0, jvm::FLOAD),
            ValueType::Double => (jvm::DLOAD_0, jvm::DLOAD),
            ValueType::Object(_) | ValueType::Array(_) => (jvm::ALOAD_0, jvm::ALOAD),
            ValueType::Void => return Err(self.malformed(offset, "void value in slot access")),
        })
    }

    fn store_family(&self, ty: &ValueType, offset: usize) -> Result<(u8, u8), BuildError> {
        Ok(match ty {
            ValueType::Int
            | ValueType::Byte
            | ValueType::Short
            | ValueType::Char
            | ValueType::Boolean => (jvm::ISTORE_0, jvm::ISTORE),
            ValueType::Long => (jvm::LSTORE_0, jvm::LSTORE),
            ValueType::Float => (jvm::FSTORE_0, jvm::FSTORE),
            ValueType::Double => (jvm::DSTORE_0, jvm::DSTORE),
            ValueType::Object(_) | ValueType::Array(_) => (jvm::ASTORE_0, jvm::ASTORE),
            ValueType::Void => return Err(self.malformed(offset, "void value in slot access")),
        })
    }

    /// Slots 0..=3 get the implicit-index opcode form; larger slots carry
    /// an explicit one-byte index operand.
    fn emit_slot_access(
        &mut self,
        implicit_base: u8,
        explicit: u8,
        slot: usize,
        offset: usize,
    ) -> Result<(), BuildError> {
        if slot <= 3 {
            self.emit(implicit_base + slot as u8);
        } else if slot <= u8::MAX as usize {
            self.emit(explicit);
            self.emit(slot as u8);
        } else {
            return Err(self.malformed(offset, format!("local slot {slot} out of range")));
        }
        Ok(())
    }

    // --- Slot typing ---

    fn arg_type(&self, n: usize, offset: usize) -> Result<ValueType, BuildError> {
        let base = if self.method.is_static { 0 } else { 1 };
        if !self.method.is_static && n == 0 {
            return Ok(ValueType::Object(self.class_name.to_string()));
        }
        self.method
            .params
            .get(n - base)
            .cloned()
            .ok_or_else(|| self.malformed(offset, format!("argument index {n} out of range")))
    }

    fn local_slot(&self, j: usize) -> usize {
        let base = if self.method.is_static { 0 } else { 1 };
        base + self.method.params.len() + j
    }

    // --- Instruction handling ---

    fn run(&mut self, code: &[u8]) -> Result<(), BuildError> {
        let mut i = 0;
        while i < code.len() {
            let offset = i;
            let op = code[i];
            i += 1;
            match op {
                il::NOP => self.emit(jvm::NOP),
                il::BREAK => self.emit(jvm::BREAKPOINT),

                il::LDARG_0..=il::LDARG_3 => {
                    self.load_arg((op - il::LDARG_0) as usize, offset)?;
                }
                il::LDARG_S => {
                    let [n] = self.take::<1>(code, i, offset)?;
                    i += 1;
                    self.load_arg(n as usize, offset)?;
                }
                il::LDLOC_0..=il::LDLOC_3 => {
                    self.load_local((op - il::LDLOC_0) as usize, offset)?;
                }
                il::LDLOC_S => {
                    let [n] = self.take::<1>(code, i, offset)?;
                    i += 1;
                    self.load_local(n as usize, offset)?;
                }
                il::STLOC_0..=il::STLOC_3 => {
                    self.store_local((op - il::STLOC_0) as usize, offset)?;
                }
                il::STLOC_S => {
                    let [n] = self.take::<1>(code, i, offset)?;
                    i += 1;
                    self.store_local(n as usize, offset)?;
                }

                il::LDC_R4 => {
                    let bytes = self.take::<4>(code, i, offset)?;
                    i += 4;
                    let value = f32::from_le_bytes(bytes);
                    let index = self.pool.float(value);
                    let at = self.out.len();
                    self.emit_ldc(index);
                    self.push_tracked(at, ValueType::Float);
                }
                il::LDSTR => {
                    let text = match self.read_token(code, &mut i, offset)? {
                        Token::Text(text) => text,
                        other => {
                            return Err(self.malformed(
                                offset,
                                format!("ldstr expects a text token, found {other:?}"),
                            ))
                        }
                    };
                    let index = self.pool.string(&text);
                    let at = self.out.len();
                    self.emit_ldc(index);
                    self.push_tracked(at, ValueType::Object("java.lang.String".to_string()));
                }

                il::DUP => {
                    let top = match self.stack.last() {
                        Some(ty) => ty.clone(),
                        None => return Err(self.malformed(offset, "dup on empty stack")),
                    };
                    self.emit(jvm::DUP);
                    // Same value duplicated, not a new one: no checkpoint.
                    self.push(top);
                }
                il::POP => {
                    self.pop(offset)?;
                    self.emit(jvm::POP);
                }

                il::ADD => {
                    let right = self.pop(offset)?;
                    let left = self.pop(offset)?;
                    let opcode = match (&left, &right) {
                        (ValueType::Float, ValueType::Float) => jvm::FADD,
                        (ValueType::Double, ValueType::Double) => jvm::DADD,
                        (ValueType::Long, ValueType::Long) => jvm::LADD,
                        (l, r) if !l.is_reference() && l == r => jvm::IADD,
                        _ => {
                            return Err(self.malformed(
                                offset,
                                format!("add on mismatched operands {left:?} and {right:?}"),
                            ))
                        }
                    };
                    let at = self.out.len();
                    self.emit(opcode);
                    self.push_tracked(at, left);
                }
                il::CONV_I4 => {
                    let from = self.pop(offset)?;
                    let at = self.out.len();
                    match from {
                        ValueType::Long => self.emit(jvm::L2I),
                        ValueType::Float => self.emit(jvm::F2I),
                        ValueType::Double => self.emit(jvm::D2I),
                        // Already an int-family value: nothing to emit.
                        _ => {}
                    }
                    self.push_tracked(at, ValueType::Int);
                }

                il::CALL | il::CALLVIRT => self.invoke(code, &mut i, offset, op)?,
                il::BOX => self.box_primitive(code, &mut i, offset)?,
                il::NEWOBJ => self.construct(code, &mut i, offset)?,

                il::LDFLD | il::STFLD | il::LDSFLD | il::STSFLD => {
                    self.field_access(code, &mut i, offset, op)?;
                }

                il::NEWARR => self.new_array(code, &mut i, offset)?,
                il::STELEM_REF => {
                    self.pop(offset)?;
                    self.pop(offset)?;
                    self.pop(offset)?;
                    self.emit(jvm::AASTORE);
                }
                il::LDTOKEN => self.load_type_token(code, &mut i, offset)?,

                il::BR_S => {
                    let [delta] = self.take::<1>(code, i, offset)?;
                    i += 1;
                    // Literal offset passthrough, sign-extended; no
                    // cross-format offset-unit conversion.
                    self.emit(jvm::GOTO);
                    self.emit_u16(delta as i8 as i16 as u16);
                }

                il::RET => {
                    let opcode = match &self.method.ret {
                        ValueType::Void => jvm::RETURN,
                        ValueType::Long => jvm::LRETURN,
                        ValueType::Float => jvm::FRETURN,
                        ValueType::Double => jvm::DRETURN,
                        ty if ty.is_reference() => jvm::ARETURN,
                        _ => jvm::IRETURN,
                    };
                    if self.method.ret != ValueType::Void && !self.stack.is_empty() {
                        self.pop(offset)?;
                    }
                    self.emit(opcode);
                }

                other => {
                    if self.options.lenient_unknown_instructions {
                        warn!(
                            class = self.class_name,
                            method = %self.method.name,
                            opcode = other,
                            offset,
                            "dropping unsupported instruction"
                        );
                    } else {
                        return Err(BuildError::UnsupportedInstruction {
                            class: self.class_name.to_string(),
                            method: self.method.name.clone(),
                            opcode: other,
                            offset,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn read_token(
        &self,
        code: &[u8],
        i: &mut usize,
        offset: usize,
    ) -> Result<Token, BuildError> {
        let bytes = self.take::<4>(code, *i, offset)?;
        *i += 4;
        self.token(u32::from_le_bytes(bytes), offset)
    }

    fn load_arg(&mut self, n: usize, offset: usize) -> Result<(), BuildError> {
        let ty = self.arg_type(n, offset)?;
        let (implicit, explicit) = self.load_family(&ty, offset)?;
        let at = self.out.len();
        self.emit_slot_access(implicit, explicit, n, offset)?;
        self.push_tracked(at, ty);
        Ok(())
    }

    fn load_local(&mut self, j: usize, offset: usize) -> Result<(), BuildError> {
        let slot = self.local_slot(j);
        let ty = self
            .locals
            .get(slot)
            .cloned()
            .flatten()
            .ok_or_else(|| self.malformed(offset, format!("load from untyped local {j}")))?;
        let (implicit, explicit) = self.load_family(&ty, offset)?;
        let at = self.out.len();
        self.emit_slot_access(implicit, explicit, slot, offset)?;
        self.push_tracked(at, ty);
        Ok(())
    }

    fn store_local(&mut self, j: usize, offset: usize) -> Result<(), BuildError> {
        let slot = self.local_slot(j);
        if slot >= self.locals.len() {
            return Err(self.malformed(offset, format!("local index {j} out of range")));
        }
        let ty = self.pop(offset)?;
        let (implicit, explicit) = self.store_family(&ty, offset)?;
        self.emit_slot_access(implicit, explicit, slot, offset)?;
        self.locals[slot] = Some(ty);
        Ok(())
    }

    fn invoke(
        &mut self,
        code: &[u8],
        i: &mut usize,
        offset: usize,
        op: u8,
    ) -> Result<(), BuildError> {
        let sym = match self.read_token(code, i, offset)? {
            Token::Method(sym) => sym,
            other => {
                return Err(
                    self.malformed(offset, format!("call expects a method token, found {other:?}"))
                )
            }
        };
        let resolved = self.resolver.resolve_method(&sym)?;
        let descriptor = method_descriptor(&sym.params, &sym.ret, self.resolver)?;

        if sym.owner_is_interface && !sym.is_static {
            let index = self
                .pool
                .interface_method_ref(&resolved.owner, &resolved.name, &descriptor);
            let arg_slots: u16 = sym.params.iter().map(ValueType::slot_width).sum();
            self.emit(jvm::INVOKEINTERFACE);
            self.emit_u16(index);
            self.emit((arg_slots + 1) as u8);
            self.emit(0);
        } else {
            let index = self
                .pool
                .method_ref(&resolved.owner, &resolved.name, &descriptor);
            let opcode = if sym.is_static {
                jvm::INVOKESTATIC
            } else if op == il::CALL {
                jvm::INVOKESPECIAL
            } else {
                jvm::INVOKEVIRTUAL
            };
            self.emit(opcode);
            self.emit_u16(index);
        }

        // The emitted invocation starts where its result value appears.
        let at = self.out.len() - if sym.owner_is_interface && !sym.is_static { 5 } else { 3 };
        for _ in 0..sym.params.len() {
            self.pop(offset)?;
        }
        if !sym.is_static {
            self.pop(offset)?;
        }
        if sym.ret != ValueType::Void {
            self.push_tracked(at, sym.ret.clone());
        }
        Ok(())
    }

    fn box_primitive(
        &mut self,
        code: &[u8],
        i: &mut usize,
        offset: usize,
    ) -> Result<(), BuildError> {
        let ty = match self.read_token(code, i, offset)? {
            Token::Type(ty) => ty,
            other => {
                return Err(
                    self.malformed(offset, format!("box expects a type token, found {other:?}"))
                )
            }
        };
        let (wrapper, letter) = ty
            .wrapper()
            .ok_or_else(|| self.malformed(offset, format!("cannot box non-primitive {ty:?}")))?;
        let descriptor = format!("({letter})L{wrapper};");
        let index = self.pool.method_ref(wrapper, "valueOf", &descriptor);
        let at = self.out.len();
        self.emit(jvm::INVOKESTATIC);
        self.emit_u16(index);
        self.pop(offset)?;
        self.push_tracked(at, ValueType::Object(wrapper.replace('/', ".")));
        Ok(())
    }

    /// Object construction: the source's single allocate-and-initialize
    /// instruction becomes allocate, duplicate, initialize. With N>0
    /// constructor arguments already emitted, allocate+duplicate must be
    /// inserted *before* the instruction that produced the first argument;
    /// the checkpoint whose recorded depth matches the stack below those
    /// arguments locates the insertion offset.
    fn construct(&mut self, code: &[u8], i: &mut usize, offset: usize) -> Result<(), BuildError> {
        let ctor = match self.read_token(code, i, offset)? {
            Token::Method(sym) => sym,
            other => {
                return Err(self.malformed(
                    offset,
                    format!("newobj expects a method token, found {other:?}"),
                ))
            }
        };
        let owner = self.resolver.resolve_class(&ctor.owner)?;
        let descriptor = method_descriptor(&ctor.params, &ValueType::Void, self.resolver)?;
        let class_index = self.pool.class(&owner);
        let init_ref = self.pool.method_ref(&owner, "<init>", &descriptor);

        let n = ctor.params.len();
        let insert_at = if n == 0 {
            let at = self.out.len();
            self.emit(jvm::NEW);
            self.emit_u16(class_index);
            self.emit(jvm::DUP);
            at
        } else {
            let want = self
                .stack
                .len()
                .checked_sub(n)
                .ok_or_else(|| self.malformed(offset, "operand stack underflow"))?;
            let at = self
                .checkpoints
                .iter()
                .rev()
                .find(|c| c.depth_before == want)
                .map(|c| c.offset)
                .ok_or_else(|| {
                    self.malformed(offset, "no stack checkpoint for constructor arguments")
                })?;
            let mut patch = Vec::with_capacity(4);
            patch.push(jvm::NEW);
            patch.extend_from_slice(&class_index.to_be_bytes());
            patch.push(jvm::DUP);
            self.out.splice(at..at, patch);
            for checkpoint in &mut self.checkpoints {
                if checkpoint.offset >= at {
                    checkpoint.offset += 4;
                }
            }
            at
        };

        for _ in 0..n {
            self.pop(offset)?;
        }
        self.checkpoints.push(Checkpoint {
            offset: insert_at,
            depth_before: self.stack.len(),
        });
        self.push(ValueType::Object(ctor.owner.clone()));
        // The duplicate sits under the arguments; account for its slot.
        self.max_stack += 1;

        self.emit(jvm::INVOKESPECIAL);
        self.emit_u16(init_ref);
        Ok(())
    }

    fn field_access(
        &mut self,
        code: &[u8],
        i: &mut usize,
        offset: usize,
        op: u8,
    ) -> Result<(), BuildError> {
        let sym = match self.read_token(code, i, offset)? {
            Token::Field(sym) => sym,
            other => {
                return Err(self.malformed(
                    offset,
                    format!("field access expects a field token, found {other:?}"),
                ))
            }
        };
        let resolved = self.resolver.resolve_field(&sym)?;
        let descriptor = sym.ty.descriptor(self.resolver)?;
        let index = self
            .pool
            .field_ref(&resolved.owner, &resolved.name, &descriptor);
        let at = self.out.len();
        match op {
            il::LDFLD => {
                self.emit(jvm::GETFIELD);
                self.emit_u16(index);
                self.pop(offset)?;
                self.push_tracked(at, sym.ty.clone());
            }
            il::STFLD => {
                self.emit(jvm::PUTFIELD);
                self.emit_u16(index);
                self.pop(offset)?;
                self.pop(offset)?;
            }
            il::LDSFLD => {
                self.emit(jvm::GETSTATIC);
                self.emit_u16(index);
                self.push_tracked(at, sym.ty.clone());
            }
            il::STSFLD => {
                self.emit(jvm::PUTSTATIC);
                self.emit_u16(index);
                self.pop(offset)?;
            }
            _ => unreachable!("field_access called with non-field opcode"),
        }
        Ok(())
    }

    fn new_array(&mut self, code: &[u8], i: &mut usize, offset: usize) -> Result<(), BuildError> {
        let element = match self.read_token(code, i, offset)? {
            Token::Type(ty) => ty,
            other => {
                return Err(self.malformed(
                    offset,
                    format!("newarr expects a type token, found {other:?}"),
                ))
            }
        };
        self.pop(offset)?; // element count
        let at = self.out.len();
        let atype = match &element {
            ValueType::Boolean => Some(jvm::ATYPE_BOOLEAN),
            ValueType::Char => Some(jvm::ATYPE_CHAR),
            ValueType::Float => Some(jvm::ATYPE_FLOAT),
            ValueType::Double => Some(jvm::ATYPE_DOUBLE),
            ValueType::Byte => Some(jvm::ATYPE_BYTE),
            ValueType::Short => Some(jvm::ATYPE_SHORT),
            ValueType::Int => Some(jvm::ATYPE_INT),
            ValueType::Long => Some(jvm::ATYPE_LONG),
            _ => None,
        };
        match atype {
            Some(atype) => {
                self.emit(jvm::NEWARRAY);
                self.emit(atype);
            }
            None => {
                let name = self.class_constant_name(&element, offset)?;
                let index = self.pool.class(&name);
                self.emit(jvm::ANEWARRAY);
                self.emit_u16(index);
            }
        }
        self.push_tracked(at, ValueType::Array(Box::new(element)));
        Ok(())
    }

    fn load_type_token(
        &mut self,
        code: &[u8],
        i: &mut usize,
        offset: usize,
    ) -> Result<(), BuildError> {
        let ty = match self.read_token(code, i, offset)? {
            Token::Type(ty) => ty,
            other => {
                return Err(self.malformed(
                    offset,
                    format!("ldtoken expects a type token, found {other:?}"),
                ))
            }
        };
        let name = self.class_constant_name(&ty, offset)?;
        let index = self.pool.class(&name);
        let at = self.out.len();
        self.emit_ldc(index);
        self.push_tracked(at, ValueType::Object("java.lang.Class".to_string()));
        Ok(())
    }

    /// Internal name used for a `Class` pool entry: plain slash name for
    /// object types, descriptor form for arrays.
    fn class_constant_name(&self, ty: &ValueType, offset: usize) -> Result<String, BuildError> {
        match ty {
            ValueType::Object(path) => self.resolver.resolve_class(path),
            ValueType::Array(_) => ty.descriptor(self.resolver),
            _ => Err(self.malformed(
                offset,
                format!("no class constant exists for primitive {ty:?}"),
            )),
        }
    }
}
