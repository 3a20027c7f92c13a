//! Integration tests for the classify → normalize → rank → publish pipeline

mod helpers;

use emo_common::events::AnalysisStatus;
use emo_common::{EmotionLabel, EmotionScore, Error};
use emo_mirror::EmotionStatePublisher;
use helpers::{scores_with_winner, test_image, GatedClassifier, ScriptedClassifier};
use std::sync::Arc;

#[tokio::test]
async fn test_session_ids_increase_and_skip_failures() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Ok(scores_with_winner(EmotionLabel::Happy, 0.5)),
        Err(Error::ClassifierFailure("face not found".into())),
        Ok(scores_with_winner(EmotionLabel::Sad, 0.5)),
    ]));
    let publisher = EmotionStatePublisher::with_capacity(classifier.clone(), 16);
    let image = test_image();

    let first = publisher.submit(&image).await.unwrap();
    assert_eq!(first.session_id, 1);

    let err = publisher.submit(&image).await.unwrap_err();
    assert!(matches!(err, Error::ClassifierFailure(_)));
    assert_eq!(publisher.analyses_completed(), 1);
    assert_eq!(publisher.latest_session(), Some(first.clone()));

    let third = publisher.submit(&image).await.unwrap();
    assert_eq!(third.session_id, 2);
    assert_eq!(third.top_emotion.label, EmotionLabel::Sad);
    assert_eq!(classifier.calls(), 3);
    assert_eq!(publisher.status(), AnalysisStatus::Idle);
}

#[tokio::test]
async fn test_failure_event_carries_previous_session() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Ok(scores_with_winner(EmotionLabel::Fear, 0.6)),
        Err(Error::ClassifierFailure("timeout".into())),
    ]));
    let publisher = EmotionStatePublisher::with_capacity(classifier, 16);
    let image = test_image();
    let first = publisher.submit(&image).await.unwrap();

    let mut sub = publisher.subscribe();
    publisher.submit(&image).await.unwrap_err();

    let started = sub.try_recv().unwrap();
    assert_eq!(started.event_type(), "AnalysisStarted");
    assert_eq!(started.snapshot().latest.as_ref(), Some(&first));

    let failed = sub.try_recv().unwrap();
    assert_eq!(failed.event_type(), "AnalysisFailed");
    assert_eq!(failed.snapshot().status, AnalysisStatus::Idle);
    assert_eq!(failed.snapshot().latest.as_ref(), Some(&first));
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn test_malformed_scores_are_rejected() {
    let missing_label: Vec<EmotionScore> = scores_with_winner(EmotionLabel::Happy, 0.5)
        .into_iter()
        .filter(|score| score.label != EmotionLabel::Disgust)
        .collect();
    let mut negative = scores_with_winner(EmotionLabel::Happy, 0.5);
    negative[3].confidence = -0.1;

    let classifier = Arc::new(ScriptedClassifier::new(vec![Ok(missing_label), Ok(negative)]));
    let publisher = EmotionStatePublisher::with_capacity(classifier, 16);
    let image = test_image();

    for _ in 0..2 {
        let err = publisher.submit(&image).await.unwrap_err();
        assert!(matches!(err, Error::InvalidScoreSet(_)), "got {:?}", err);
        assert!(err.is_analysis_failure());
    }
    assert!(publisher.latest_session().is_none());
    assert_eq!(publisher.analyses_completed(), 0);
}

#[tokio::test]
async fn test_all_zero_scores_become_uniform() {
    let zeros: Vec<EmotionScore> = EmotionLabel::ALL
        .iter()
        .map(|&label| EmotionScore::new(label, 0.0))
        .collect();
    let publisher =
        EmotionStatePublisher::with_capacity(Arc::new(ScriptedClassifier::new(vec![Ok(zeros)])), 16);

    let session = publisher.submit(&test_image()).await.unwrap();
    for score in session.distribution.iter() {
        assert!((score.confidence - 1.0 / 7.0).abs() < 1e-9);
    }
    // Ties resolve in canonical order
    assert_eq!(session.top_emotion.label, EmotionLabel::Happy);
}

#[tokio::test]
async fn test_happy_sad_example_ranks_happy_first() {
    let raw: Vec<EmotionScore> = EmotionLabel::ALL
        .iter()
        .map(|&label| {
            let confidence = match label {
                EmotionLabel::Happy => 0.8,
                EmotionLabel::Sad => 0.2,
                _ => 0.0,
            };
            EmotionScore::new(label, confidence)
        })
        .collect();
    let publisher =
        EmotionStatePublisher::with_capacity(Arc::new(ScriptedClassifier::new(vec![Ok(raw)])), 16);

    let session = publisher.submit(&test_image()).await.unwrap();
    let labels: Vec<EmotionLabel> = session.distribution.iter().map(|s| s.label).collect();
    assert_eq!(
        labels,
        vec![
            EmotionLabel::Happy,
            EmotionLabel::Sad,
            EmotionLabel::Angry,
            EmotionLabel::Surprised,
            EmotionLabel::Fear,
            EmotionLabel::Disgust,
            EmotionLabel::Neutral,
        ]
    );
    assert!((session.top_emotion.confidence - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_reentrant_submit_is_rejected_without_disturbing_analysis() {
    let classifier = Arc::new(GatedClassifier::new(EmotionLabel::Surprised));
    let publisher = Arc::new(EmotionStatePublisher::with_capacity(classifier.clone(), 16));
    let mut sub = publisher.subscribe();

    let in_flight = {
        let publisher = Arc::clone(&publisher);
        tokio::spawn(async move { publisher.submit(&test_image()).await })
    };
    classifier.wait_entered().await;
    assert_eq!(publisher.status(), AnalysisStatus::Analyzing);

    let err = publisher.submit(&test_image()).await.unwrap_err();
    assert!(matches!(err, Error::ReentrantAnalysis));
    assert!(!err.is_analysis_failure());
    assert_eq!(publisher.status(), AnalysisStatus::Analyzing);

    classifier.release();
    let session = in_flight.await.unwrap().unwrap();
    assert_eq!(session.session_id, 1);
    assert_eq!(session.top_emotion.label, EmotionLabel::Surprised);

    // The rejected call published nothing
    let events: Vec<String> = std::iter::from_fn(|| sub.try_recv())
        .map(|event| event.event_type().to_string())
        .collect();
    assert_eq!(events, vec!["AnalysisStarted", "AnalysisCompleted"]);
}
