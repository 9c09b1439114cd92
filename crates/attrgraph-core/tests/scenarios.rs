//! Concrete end-to-end scenarios covering independent inputs, write
//! propagation, chains, shared producers, and a small multi-field
//! "layout" tree built from rule composition.

use attrgraph_core::Graph;

#[test]
fn scenario_a_independent_inputs() {
    let g = Graph::new();
    let x = g.create_input("x", 2);
    let y = g.create_input("y", 3);
    let (xc, yc) = (x.clone(), y.clone());
    let sum = g.create_rule("sum", move || xc.read() + yc.read());

    assert_eq!(sum.read(), 5);

    let snap = g.snapshot();
    let sum_val = snap.nodes.iter().find(|n| n.name == "sum").unwrap();
    assert!(sum_val.is_rule);
    assert!(!sum_val.potentially_dirty);
    for edge in snap.edges.iter().filter(|e| e.to == sum.id()) {
        assert!(!edge.pending);
    }
}

#[test]
fn scenario_b_write_propagates() {
    let g = Graph::new();
    let x = g.create_input("x", 2);
    let y = g.create_input("y", 3);
    let (xc, yc) = (x.clone(), y.clone());
    let sum = g.create_rule("sum", move || xc.read() + yc.read());
    assert_eq!(sum.read(), 5);

    x.write(10).unwrap();

    let before = g.snapshot();
    let x_edge = before
        .edges
        .iter()
        .find(|e| e.from == x.id() && e.to == sum.id())
        .unwrap();
    assert!(x_edge.pending);
    let sum_before = before.nodes.iter().find(|n| n.name == "sum").unwrap();
    assert!(sum_before.potentially_dirty);
    assert_eq!(sum_before.value, "5");

    assert_eq!(sum.read(), 13);

    let after = g.snapshot();
    let sum_after = after.nodes.iter().find(|n| n.name == "sum").unwrap();
    assert!(!sum_after.potentially_dirty);
    assert_eq!(sum_after.value, "13");
    let x_edge_after = after
        .edges
        .iter()
        .find(|e| e.from == x.id() && e.to == sum.id())
        .unwrap();
    assert!(!x_edge_after.pending);
}

#[test]
fn scenario_c_chain() {
    let g = Graph::new();
    let a = g.create_input("a", 1);
    let ac = a.clone();
    let b = g.create_rule("b", move || ac.read() * 2);
    let bc = b.clone();
    let c = g.create_rule("c", move || bc.read() + 1);

    assert_eq!(c.read(), 3);
    a.write(5).unwrap();
    assert_eq!(c.read(), 11);

    let snap = g.snapshot();
    for node in &snap.nodes {
        assert!(!node.potentially_dirty, "{} should be clean", node.name);
    }
    for edge in &snap.edges {
        assert!(!edge.pending);
    }
}

#[test]
fn scenario_d_shared_producer() {
    let g = Graph::new();
    let a = g.create_input("a", 1);
    let (a1, a2) = (a.clone(), a.clone());
    let b = g.create_rule("b", move || a1.read() + 1);
    let c = g.create_rule("c", move || a2.read() + 2);
    let (bc, cc) = (b.clone(), c.clone());
    let d = g.create_rule("d", move || bc.read() + cc.read());

    assert_eq!(d.read(), 5);
    a.write(10).unwrap();
    assert_eq!(d.read(), 23);

    let snap = g.snapshot();
    assert_eq!(snap.edges.len(), 4, "a→b, a→c, b→d, c→d, no more");
}

#[test]
fn scenario_f_layout_collaborator() {
    let g = Graph::new();
    let width = g.create_input("width", 200i64);
    let height = g.create_input("height", 100i64);

    let (w1, h1) = (width.clone(), height.clone());
    let area = g.create_rule("area", move || w1.read() * h1.read());
    let (w2, area_for_frame) = (width.clone(), area.clone());
    let frame = g.create_rule("frame", move || {
        format!("{}x{} area={}", w2.read(), height.read(), area_for_frame.read())
    });

    let first = frame.read();
    width.write(300).unwrap();
    let second = frame.read();

    assert_ne!(first, second);
    assert_eq!(second, "300x100 area=30000");

    let snap = g.snapshot();
    for node in &snap.nodes {
        assert!(!node.potentially_dirty, "{} should be clean after read", node.name);
    }
    for edge in &snap.edges {
        assert!(!edge.pending);
    }
}
