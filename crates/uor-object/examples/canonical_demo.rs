//! Demonstrates canonical-form convergence and prime decomposition.
//!
//! Run with: `cargo run --example canonical_demo -p uor-object`

use uor_object::prelude::*;

fn main() {
    // Two messages with identical semantic content, assembled differently.
    let first = Message::new("m-1", "uor://ns/identity/alice", &["bob", "carol"], "hello")
        .with_subject("greetings");
    let second = Message::new("m-1", "uor://ns/identity/alice", &["carol", "bob"], "hello")
        .with_subject("greetings");

    let canonical = first.compute_canonical_representation();
    println!("canonical content: {}", canonical.content);
    println!(
        "convergent: {}",
        canonical.content == second.compute_canonical_representation().content
    );

    println!("\nprime factors:");
    for factor in &first.compute_prime_decomposition().prime_factors {
        println!("  {:40} [{}]", factor.id, factor.domain);
    }

    let coherence = first.measure_coherence();
    println!(
        "\ncoherence: {:.2} ({} / {})",
        coherence.value,
        coherence.kind,
        coherence.normalization.as_str()
    );

    // Frame transforms change the view, not the content.
    let frame = ObserverFrame::new("frame:alice", Perspective::Subjective)
        .with_invariants(&["id", "canonicalRepresentation"])
        .shared();
    let viewed = first.transform_to_frame(frame);
    println!(
        "\nframe-invariant: {}",
        viewed.compute_canonical_representation().content == canonical.content
    );
}
