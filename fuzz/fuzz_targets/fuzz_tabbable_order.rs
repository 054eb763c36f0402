#![no_main]

//! Builds arbitrary trees and checks the tab-order invariant of the index.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabtrap_a11y::tabbable_sequence;
use tabtrap_core::dom::{Document, DomTree};
use tabtrap_style::StyleDecl;

#[derive(Debug, Arbitrary)]
struct Op {
    parent: u8,
    interactive: bool,
    tabindex: Option<i8>,
    disabled: bool,
    hidden: bool,
    text: bool,
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 512 {
        return;
    }
    let mut doc = Document::new();
    let Ok(root) = doc.append_element(doc.body(), "div") else {
        return;
    };
    let mut elements = vec![root];
    for op in &ops {
        let parent = elements[usize::from(op.parent) % elements.len()];
        if op.text {
            let _ = doc.append_text(parent, "t");
            continue;
        }
        let tag = if op.interactive { "button" } else { "div" };
        let Ok(id) = doc.append_element(parent, tag) else {
            continue;
        };
        if let Some(t) = op.tabindex {
            let _ = doc.set_attribute(id, "tabindex", t.to_string());
        }
        if op.disabled {
            let _ = doc.toggle_attribute(id, "disabled", true);
        }
        if op.hidden {
            let _ = doc.set_inline_style(id, StyleDecl::hidden());
        }
        elements.push(id);
    }

    let sequence = tabbable_sequence(&doc, root);
    let orders: Vec<i32> = sequence.iter().map(|n| n.tab_order).collect();
    let split = orders.iter().position(|&t| t == 0).unwrap_or(orders.len());
    assert!(orders[..split].windows(2).all(|w| w[0] <= w[1]));
    assert!(orders[..split].iter().all(|&t| t > 0));
    assert!(orders[split..].iter().all(|&t| t == 0));
    for node in &sequence {
        assert!(!doc.is_disabled(node.element));
        assert!(!doc.computed_style(node.element).hides());
    }
    assert_eq!(sequence, tabbable_sequence(&doc, root));
});
