use vaultdb_core::traits::Embedder;
use vaultdb_embed::{FakeEmbedder, FAKE_EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::default();
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), FAKE_EMBEDDING_DIM, "embedding dim is {FAKE_EMBEDDING_DIM}");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn every_vector_in_a_batch_has_the_same_length() {
    let embedder = FakeEmbedder::new(384);
    let texts: Vec<String> = ["", "one", "two words", "a much longer chunk of text with many tokens"].iter().map(|s| s.to_string()).collect();
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(embs.len(), texts.len());
    assert!(embs.iter().all(|v| v.len() == 384));
}
