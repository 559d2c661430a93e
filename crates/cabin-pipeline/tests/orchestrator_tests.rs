//! End-to-end answer flow through the public pipeline API, driven entirely
//! by mock collaborators.

use cabin_pipeline::{
    MockGenerator, MockRetriever, MockSynthesizer, PipelineSettings, ResponseOrchestrator,
    RetrievedPassage, DEFAULT_WARM_QUERIES, NO_RESULTS_SENTINEL,
};
use cabin_segment::END_MARKER;

fn manual_passage(text: &str, similarity: f64) -> RetrievedPassage {
    RetrievedPassage {
        text: text.to_string(),
        similarity,
        section: "第3章 保养".to_string(),
        subsection: "机油".to_string(),
    }
}

#[tokio::test]
async fn test_full_factual_flow() {
    let retriever = MockRetriever::with_passages(vec![manual_passage(
        "第3章。机油。每5000公里或每半年更换机油。使用原厂规格机油。",
        0.92,
    )]);
    let generator = MockGenerator::new();
    let synthesizer = MockSynthesizer::new();
    let mut orch = ResponseOrchestrator::new(
        retriever,
        generator.clone(),
        synthesizer.clone(),
        PipelineSettings::default(),
    );

    let answer = orch.answer("机油更换周期是多久").await.unwrap();

    // Manual text verbatim, generator untouched, formatting fragments
    // skipped before speech.
    assert!(answer.starts_with("第3章"));
    assert_eq!(generator.call_count(), 0);
    assert_eq!(
        synthesizer.spoken(),
        vec!["每5000公里或每半年更换机油", "使用原厂规格机油"]
    );
}

#[tokio::test]
async fn test_low_similarity_passages_do_not_answer() {
    let retriever = MockRetriever::with_passages(vec![manual_passage("不相关内容", 0.2)]);
    let mut orch = ResponseOrchestrator::new(
        retriever,
        MockGenerator::new(),
        MockSynthesizer::new(),
        PipelineSettings::default(),
    );

    let answer = orch.answer("发动机故障").await.unwrap();
    assert_eq!(answer, NO_RESULTS_SENTINEL);
}

#[tokio::test]
async fn test_repeat_question_is_answered_once() {
    let retriever = MockRetriever::with_text("请立即靠边停车");
    let mut orch = ResponseOrchestrator::new(
        retriever.clone(),
        MockGenerator::new(),
        MockSynthesizer::new(),
        PipelineSettings::default(),
    );

    for _ in 0..5 {
        let answer = orch.answer("发动机故障怎么办").await.unwrap();
        assert_eq!(answer, "请立即靠边停车");
    }
    assert_eq!(retriever.call_count(), 1);
    assert_eq!(orch.cache().len(), 1);
}

#[tokio::test]
async fn test_distinct_questions_get_distinct_cache_entries() {
    let retriever = MockRetriever::with_text("手册内容");
    let mut orch = ResponseOrchestrator::new(
        retriever,
        MockGenerator::new(),
        MockSynthesizer::new(),
        PipelineSettings::default(),
    );

    orch.answer("发动机故障").await.unwrap();
    orch.answer("空调不制冷").await.unwrap();
    orch.answer("推荐一个旅游攻略").await.unwrap();
    assert_eq!(orch.cache().len(), 3);
}

#[tokio::test]
async fn test_warm_then_answer_is_pure_cache() {
    let retriever = MockRetriever::with_text("预热的手册答案");
    let synthesizer = MockSynthesizer::new();
    let mut orch = ResponseOrchestrator::new(
        retriever.clone(),
        MockGenerator::new(),
        synthesizer.clone(),
        PipelineSettings::default(),
    );

    let warmed = orch.warm_cache(&DEFAULT_WARM_QUERIES).await.unwrap();
    assert_eq!(warmed, 4);
    assert!(synthesizer.spoken().is_empty());

    let answer = orch.answer("发动机故障").await.unwrap();
    assert_eq!(answer, "预热的手册答案");
    // Warming did the only retrieval; the answer came from the cache and
    // cache hits are not re-spoken.
    assert_eq!(retriever.call_count(), 4);
    assert!(synthesizer.spoken().is_empty());
}

#[tokio::test]
async fn test_streaming_hybrid_flow() {
    let retriever = MockRetriever::with_text("相关手册内容");
    let generator = MockGenerator::new();
    let synthesizer = MockSynthesizer::new();
    let mut orch = ResponseOrchestrator::new(
        retriever,
        generator.clone(),
        synthesizer.clone(),
        PipelineSettings::default(),
    );

    // Unknown category takes the hybrid path with streaming generation.
    let answer = orch.answer_streaming("你好").await.unwrap();

    assert_eq!(generator.prompts(), vec!["你好<rag>相关手册内容"]);
    assert_eq!(answer, "生成回答：你好<rag>相关手册内容。");

    let spoken = synthesizer.spoken();
    assert_eq!(spoken.first().map(String::as_str), Some("生成回答"));
    assert_eq!(spoken.last().map(String::as_str), Some(END_MARKER));
}

#[tokio::test]
async fn test_custom_settings_are_honored() {
    let retriever = MockRetriever::with_passages(vec![manual_passage("第一句。第二句。第三句。", 0.6)]);
    let synthesizer = MockSynthesizer::new();
    let settings = PipelineSettings {
        top_k: 3,
        similarity_threshold: 0.5,
        skip_leading: 0,
        cache_capacity: 2,
    };
    let mut orch = ResponseOrchestrator::new(
        retriever,
        MockGenerator::new(),
        synthesizer.clone(),
        settings,
    );

    orch.answer("发动机故障").await.unwrap();
    // skip_leading 0: every sentence is spoken.
    assert_eq!(synthesizer.spoken(), vec!["第一句", "第二句", "第三句"]);

    // capacity 2: the third distinct answer flushes the first two.
    orch.answer("空调不制冷").await.unwrap();
    orch.answer("保养周期").await.unwrap();
    assert_eq!(orch.cache().len(), 1);
}
