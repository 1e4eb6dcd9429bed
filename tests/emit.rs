use modforge::attribute_info::CodeAttribute;
use modforge::constant_info::ConstantInfo;
use modforge::descriptor::{
    ClassDescriptor, FieldDescriptor, FieldSymbol, MethodDescriptor, MethodSymbol, Token,
    ValueType, Visibility,
};
use modforge::descriptor::BindingPolicy;
use modforge::emit::ClassEmitter;
use modforge::error::BuildError;
use modforge::mappings::SymbolResolver;
use modforge::method_info::MethodAccessFlags;
use modforge::{ClassAccessFlags, ClassFile, MAJOR_VERSION};

fn utf8_at(class_file: &ClassFile, index: u16) -> String {
    match &class_file.const_pool[index as usize - 1] {
        ConstantInfo::Utf8(utf8) => utf8.as_str().into_owned(),
        other => panic!("pool entry {index} is not Utf8: {other:?}"),
    }
}

fn greeter() -> ClassDescriptor {
    let out_field = Token::Field(FieldSymbol {
        owner: "java.lang.System".to_string(),
        name: "out".to_string(),
        ty: ValueType::Object("java.io.PrintStream".to_string()),
        is_static: true,
        binding: BindingPolicy::Default,
    });
    let println = Token::Method(MethodSymbol {
        owner: "java.io.PrintStream".to_string(),
        name: "println".to_string(),
        params: vec![ValueType::Object("java.lang.String".to_string())],
        ret: ValueType::Void,
        is_static: false,
        owner_is_interface: false,
        binding: BindingPolicy::Default,
    });
    ClassDescriptor {
        name: "demo.Greeter".to_string(),
        super_class: "java.lang.Object".to_string(),
        interfaces: vec![],
        is_interface: false,
        fields: vec![FieldDescriptor {
            name: "greeting".to_string(),
            ty: ValueType::Object("java.lang.String".to_string()),
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
        }],
        methods: vec![MethodDescriptor {
            name: "greet".to_string(),
            params: vec![],
            ret: ValueType::Void,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            code: Some(vec![
                0x7E, 0, 0, 0, 0, // ldsfld System.out
                0x72, 1, 0, 0, 0, // ldstr
                0x6F, 2, 0, 0, 0, // callvirt println
                0x2A,
            ]),
            tokens: vec![out_field, Token::Text("hello".to_string()), println],
            local_count: 0,
        }],
    }
}

#[test]
fn emits_a_parseable_class_file() {
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&greeter()).unwrap();
    assert_eq!(emitted.name, "demo/Greeter");

    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();
    assert_eq!(class_file.major_version, MAJOR_VERSION);
    assert_eq!(class_file.minor_version, 0);
    assert_eq!(
        class_file.access_flags,
        ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER
    );
    assert_eq!(class_file.fields_count, 1);
    assert_eq!(
        class_file.const_pool_size as usize,
        class_file.const_pool.len() + 1
    );

    // this/super resolve through the pool.
    let this_name = match &class_file.const_pool[class_file.this_class as usize - 1] {
        ConstantInfo::Class(c) => utf8_at(&class_file, c.name_index),
        other => panic!("this_class is not a Class entry: {other:?}"),
    };
    assert_eq!(this_name, "demo/Greeter");
}

#[test]
fn synthesizes_a_default_constructor() {
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&greeter()).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();

    // greet plus the synthesized <init>.
    assert_eq!(class_file.methods_count, 2);
    let init = class_file
        .methods
        .iter()
        .find(|m| utf8_at(&class_file, m.name_index) == "<init>")
        .expect("synthesized constructor present");
    assert_eq!(utf8_at(&class_file, init.descriptor_index), "()V");
    assert_eq!(init.access_flags, MethodAccessFlags::PUBLIC);
    assert_eq!(init.attributes_count, 1);
}

#[test]
fn declared_constructor_suppresses_the_synthesized_one() {
    let mut class = greeter();
    class.methods.push(MethodDescriptor {
        name: "<init>".to_string(),
        params: vec![],
        ret: ValueType::Void,
        visibility: Visibility::Public,
        is_static: false,
        is_abstract: false,
        // ldarg.0, call Object.<init>, ret
        code: Some(vec![0x02, 0x28, 0, 0, 0, 0, 0x2A]),
        tokens: vec![Token::Method(MethodSymbol {
            owner: "java.lang.Object".to_string(),
            name: "<init>".to_string(),
            params: vec![],
            ret: ValueType::Void,
            is_static: false,
            owner_is_interface: false,
            binding: BindingPolicy::Default,
        })],
        local_count: 0,
    });
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&class).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();
    assert_eq!(class_file.methods_count, 2);
}

#[test]
fn interfaces_get_interface_flags_and_no_constructor() {
    let class = ClassDescriptor {
        name: "demo.Handler".to_string(),
        super_class: "java.lang.Object".to_string(),
        interfaces: vec![],
        is_interface: true,
        fields: vec![],
        methods: vec![MethodDescriptor {
            name: "handle".to_string(),
            params: vec![ValueType::Int],
            ret: ValueType::Void,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: true,
            code: None,
            tokens: vec![],
            local_count: 0,
        }],
    };
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&class).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();

    assert_eq!(
        class_file.access_flags,
        ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT
    );
    assert_eq!(class_file.methods_count, 1);
    let handle = &class_file.methods[0];
    assert!(handle.access_flags.contains(MethodAccessFlags::ABSTRACT));
    // Abstract methods carry no Code attribute.
    assert_eq!(handle.attributes_count, 0);
}

#[test]
fn concrete_method_without_a_body_is_fatal() {
    let mut class = greeter();
    class.methods[0].code = None;
    let resolver = SymbolResolver::new(None);
    let err = ClassEmitter::new(&resolver).emit(&class).unwrap_err();
    assert!(matches!(err, BuildError::MissingInstructionBody { .. }));
}

#[test]
fn serialization_round_trips() {
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&greeter()).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();
    assert_eq!(class_file.to_bytes().unwrap(), emitted.bytes);
}

#[test]
fn literal_returning_method_round_trips_code_and_pool() {
    let class = ClassDescriptor {
        name: "demo.Answer".to_string(),
        super_class: "java.lang.Object".to_string(),
        interfaces: vec![],
        is_interface: false,
        fields: vec![],
        methods: vec![MethodDescriptor {
            name: "answer".to_string(),
            params: vec![],
            ret: ValueType::Float,
            visibility: Visibility::Public,
            is_static: true,
            is_abstract: false,
            code: Some({
                let mut code = vec![0x22];
                code.extend_from_slice(&42.0f32.to_le_bytes());
                code.push(0x2A);
                code
            }),
            tokens: vec![],
            local_count: 0,
        }],
    };
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&class).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();

    assert!(class_file
        .const_pool
        .iter()
        .any(|entry| matches!(entry, ConstantInfo::Float(f) if f.value == 42.0)));

    let answer = class_file
        .methods
        .iter()
        .find(|m| utf8_at(&class_file, m.name_index) == "answer")
        .unwrap();
    let code = CodeAttribute::from_attribute(&answer.attributes[0]).unwrap();
    let float_index = class_file
        .const_pool
        .iter()
        .position(|entry| matches!(entry, ConstantInfo::Float(_)))
        .unwrap() as u8
        + 1;
    // ldc <float>, freturn
    assert_eq!(code.code, vec![0x12, float_index, 0xAE]);
    assert_eq!(code.max_stack, 1);
    assert_eq!(code.max_locals, 1);
}

#[test]
fn implemented_interfaces_are_interned() {
    let mut class = greeter();
    class.interfaces.push("demo.Handler".to_string());
    let resolver = SymbolResolver::new(None);
    let emitted = ClassEmitter::new(&resolver).emit(&class).unwrap();
    let class_file = ClassFile::from_bytes(&emitted.bytes).unwrap();

    assert_eq!(class_file.interfaces_count, 1);
    let name = match &class_file.const_pool[class_file.interfaces[0] as usize - 1] {
        ConstantInfo::Class(c) => utf8_at(&class_file, c.name_index),
        other => panic!("interface entry is not a Class: {other:?}"),
    };
    assert_eq!(name, "demo/Handler");
}
