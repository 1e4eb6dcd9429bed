use modforge::constant_info::ConstantInfo;
use modforge::constant_pool::ConstantPool;

#[test]
fn interning_is_idempotent() {
    let mut pool = ConstantPool::new();
    let first = pool.utf8("java/lang/Object");
    let second = pool.utf8("java/lang/Object");
    assert_eq!(first, second);
    assert_eq!(pool.len(), 1);
}

#[test]
fn indices_are_one_based() {
    let mut pool = ConstantPool::new();
    assert_eq!(pool.utf8("a"), 1);
    assert_eq!(pool.utf8("b"), 2);
    assert_eq!(pool.count(), 3);
}

#[test]
fn composite_entries_intern_children_first() {
    let mut pool = ConstantPool::new();
    let method_ref = pool.method_ref("demo/Vec", "<init>", "(FF)V");

    // Children appear before the composite that references them.
    let entries = pool.entries();
    assert_eq!(entries.len(), 6);
    assert!(matches!(entries[0], ConstantInfo::Utf8(ref u) if u.as_str() == "demo/Vec"));
    assert!(matches!(entries[1], ConstantInfo::Class(ref c) if c.name_index == 1));
    assert!(matches!(entries[2], ConstantInfo::Utf8(ref u) if u.as_str() == "<init>"));
    assert!(matches!(entries[3], ConstantInfo::Utf8(ref u) if u.as_str() == "(FF)V"));
    assert!(
        matches!(entries[4], ConstantInfo::NameAndType(ref n) if n.name_index == 3 && n.descriptor_index == 4)
    );
    assert_eq!(method_ref, 6);
    assert!(
        matches!(entries[5], ConstantInfo::MethodRef(ref m) if m.class_index == 2 && m.name_and_type_index == 5)
    );
}

#[test]
fn composite_interning_shares_children() {
    let mut pool = ConstantPool::new();
    let field = pool.field_ref("demo/Thing", "count", "I");
    let method = pool.method_ref("demo/Thing", "count", "()I");

    // Same class and member name, so the Utf8 and Class entries are shared.
    assert_ne!(field, method);
    // demo/Thing, Class, count, I, NAT, FieldRef, ()I, NAT, MethodRef
    assert_eq!(pool.len(), 9);
}

#[test]
fn floats_are_keyed_by_bits() {
    let mut pool = ConstantPool::new();
    let a = pool.float(1.5);
    let b = pool.float(1.5);
    let c = pool.float(-1.5);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn repeated_lookup_preserves_pool_size() {
    let mut pool = ConstantPool::new();
    pool.string("hello");
    let before = pool.len();
    pool.string("hello");
    pool.utf8("hello");
    assert_eq!(pool.len(), before);
}
