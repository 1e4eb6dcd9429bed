//! Builds a minimal hello-world mod jar in the current directory.
//!
//! ```sh
//! cargo run --example build_mod
//! ```

use modforge::descriptor::{
    BindingPolicy, ClassDescriptor, FieldSymbol, MethodDescriptor, MethodSymbol, Token, ValueType,
    Visibility,
};
use modforge::{build_mod, ModArchive, SymbolResolver, TranslateOptions};

fn hello_class() -> ClassDescriptor {
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
        name: "example.HelloMod".to_string(),
        super_class: "java.lang.Object".to_string(),
        interfaces: vec![],
        is_interface: false,
        fields: vec![],
        methods: vec![MethodDescriptor {
            name: "onInitialize".to_string(),
            params: vec![],
            ret: ValueType::Void,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            code: Some(vec![
                0x7E, 0, 0, 0, 0, // ldsfld System.out
                0x72, 1, 0, 0, 0, // ldstr "Hello, world!"
                0x6F, 2, 0, 0, 0, // callvirt println
                0x2A, // ret
            ]),
            tokens: vec![
                out_field,
                Token::Text("Hello, world!".to_string()),
                println,
            ],
            local_count: 0,
        }],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let resolver = SymbolResolver::new(None);
    let mut archive = ModArchive::new("hellomod", "0.1.0", "1.21.1");
    archive.set_entrypoint("example.HelloMod");

    let archive = build_mod(
        &[hello_class()],
        &resolver,
        &TranslateOptions::default(),
        archive,
    )?;
    let path = archive.save(".")?;
    println!("wrote {}", path.display());
    Ok(())
}
