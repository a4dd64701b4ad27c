// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations. Each returns the JSON document to print.

use crate::config::PromptMathSettings;
use crate::error::CliError;
use crate::library::TokenLibrary;
use crate::payload::{
    EvaluationPayload, FrontendConfig, ParsePayload, SchedulePayload, WeightRow, WeightTable,
};
use indexmap::IndexMap;
use prompt_math_expr::{evaluate, parse, PadSource, ScheduleFactory, Vector};
use prompt_math_schedule::{AttentionScheduler, TimestepConverter, TokenSchedule};

/// Parse an expression and describe its tree
pub fn parse_command(expression: &str) -> Result<String, CliError> {
    let ast = parse(expression)?;
    Ok(serde_json::to_string_pretty(&ParsePayload::new(&ast))?)
}

/// Evaluate an expression against a library
pub fn eval_command(
    expression: &str,
    library: &TokenLibrary,
    settings: &PromptMathSettings,
) -> Result<String, CliError> {
    let (vector, schedules, _) = run_evaluation(expression, library, settings)?;
    let payload = EvaluationPayload {
        encoder: settings.encoder.clone(),
        vector,
        schedules: schedules.iter().map(SchedulePayload::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Evaluate an expression and tabulate token weights over `steps` steps
pub fn weights_command(
    expression: &str,
    library: &TokenLibrary,
    settings: &PromptMathSettings,
    steps: u32,
) -> Result<String, CliError> {
    let (_, schedules, scheduler) = run_evaluation(expression, library, settings)?;
    let ast = parse(expression)?;

    let mut tokens: Vec<&str> = Vec::new();
    for token in ast.tokens() {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    let progress = TimestepConverter::steps(steps);
    let mut rows = Vec::new();
    for step in 0..=steps {
        let time = progress.to_normalized(f64::from(step))?;
        let weights: IndexMap<String, f64> = tokens
            .iter()
            .map(|token| (token.to_string(), scheduler.weight_at(token, time)))
            .collect();
        rows.push(WeightRow {
            step,
            time,
            raw: settings.timestep.from_normalized(time)?,
            weights,
        });
    }

    let table = WeightTable {
        encoder: settings.encoder.clone(),
        mode: settings.timestep.mode,
        schedules: schedules.iter().map(SchedulePayload::from).collect(),
        rows,
    };
    Ok(serde_json::to_string_pretty(&table)?)
}

/// Describe the registered schedule functions and example expressions
pub fn functions_command() -> Result<String, CliError> {
    let config = FrontendConfig::new(&ScheduleFactory::new());
    Ok(serde_json::to_string_pretty(&config)?)
}

/// Evaluate with a fresh context; the scheduler holds every schedule found
fn run_evaluation(
    expression: &str,
    library: &TokenLibrary,
    settings: &PromptMathSettings,
) -> Result<(Vector, Vec<TokenSchedule>, AttentionScheduler), CliError> {
    let ast = parse(expression)?;
    let pad = library.pad_vector(settings.pad_token.as_deref())?;
    let pad_source = move || pad.clone();

    let mut ctx = settings.context(&settings.encoder);
    let (vector, schedules) = evaluate(
        &ast,
        library,
        &settings.encoder,
        Some(&pad_source as &dyn PadSource),
        Some(&mut ctx),
    )?;

    let scheduler = if ctx.auto_register {
        ctx.scheduler
    } else {
        let mut scheduler = AttentionScheduler::new();
        for schedule in &schedules {
            scheduler.register(schedule.clone());
        }
        scheduler
    };
    tracing::info!(
        tokens = ?ast.tokens(),
        schedules = schedules.len(),
        "evaluated expression"
    );
    Ok((vector, schedules, scheduler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_math_schedule::{TimestepMode, TokenIndex};
    use serde_json::Value;

    fn library() -> TokenLibrary {
        TokenLibrary::from_vectors([
            ("king".to_string(), Vector::from(vec![1.0, 1.0])),
            ("man".to_string(), Vector::from(vec![1.0, 0.0])),
            ("woman".to_string(), Vector::from(vec![0.0, 1.0])),
            ("<pad>".to_string(), Vector::from(vec![0.5, 0.5])),
        ])
    }

    #[test]
    fn test_parse_command() {
        let out: Value =
            serde_json::from_str(&parse_command("[[ [king] - [man] + [woman] ]]").unwrap()).unwrap();
        // The first `-` splits, so the remainder groups as one operand
        assert_eq!(out["tokens"], serde_json::json!(["king", "man", "woman"]));
        assert_eq!(out["canonical"], "[[king] - [[man] + [woman]]]");

        let err = parse_command("[[king]").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_eval_command() {
        let settings = PromptMathSettings::default();
        let out: Value = serde_json::from_str(
            &eval_command(
                "[[ [king] - [man] + [[woman] @ fade_in(0.2, 0.8, curve=\"smooth\", strength=2)] ]]",
                &library(),
                &settings,
            )
            .unwrap(),
        )
        .unwrap();

        assert_eq!(out["encoder"], "clip_l");
        assert_eq!(out["vector"], serde_json::json!([0.0, 0.0]));
        let schedule = &out["schedules"][0];
        assert_eq!(schedule["token"], "woman");
        assert_eq!(schedule["direction"], "fade_in");
        assert_eq!(schedule["start"], 0.2);
        assert_eq!(schedule["end"], 0.8);
        assert_eq!(schedule["curve"], "smooth");
        assert_eq!(schedule["clamp_output"], true);
        assert_eq!(schedule["indices"], serde_json::json!([2]));
        assert_eq!(schedule["metadata"], serde_json::json!({"strength": 2}));
    }

    #[test]
    fn test_eval_pads_unknown_tokens() {
        let settings = PromptMathSettings {
            pad_token: Some("<pad>".into()),
            ..Default::default()
        };
        let out: Value =
            serde_json::from_str(&eval_command("[king] - [queen]", &library(), &settings).unwrap())
                .unwrap();
        assert_eq!(out["vector"], serde_json::json!([0.5, 0.5]));

        let settings = PromptMathSettings {
            pad_token: Some("<unk>".into()),
            ..Default::default()
        };
        let err = eval_command("[king]", &library(), &settings).unwrap_err();
        assert!(matches!(err, CliError::MissingPadToken(_)));
    }

    #[test]
    fn test_eval_unknown_function() {
        let err = eval_command("[[ [king] @ pulse(3) ]]", &library(), &Default::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("pulse"));
    }

    #[test]
    fn test_weights_command() {
        let settings = PromptMathSettings {
            timestep: TimestepConverter::new(TimestepMode::TimeBased).with_max_time(10.0),
            ..Default::default()
        };
        let out: Value = serde_json::from_str(
            &weights_command(
                "[[ [[king] @ fade_out(0.0, 0.5)] + [[woman] @ fade_in(0.5, 1.0)] - [man] ]]",
                &library(),
                &settings,
                4,
            )
            .unwrap(),
        )
        .unwrap();

        assert_eq!(out["mode"], "time_based");
        let rows = out["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["weights"], serde_json::json!({"king": 1.0, "woman": 0.0, "man": 1.0}));
        assert_eq!(rows[2]["time"], 0.5);
        assert_eq!(rows[2]["raw"], 5.0);
        assert_eq!(rows[4]["weights"], serde_json::json!({"king": 0.0, "woman": 1.0, "man": 1.0}));
    }

    #[test]
    fn test_weights_without_auto_register() {
        let settings = PromptMathSettings {
            auto_register: false,
            ..Default::default()
        };
        let out: Value = serde_json::from_str(
            &weights_command("[[ [king] @ fade_in(0.0, 1.0) ]]", &library(), &settings, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(out["rows"][1]["weights"]["king"], 0.5);
    }

    #[test]
    fn test_weights_rejects_zero_steps() {
        let err = weights_command("[king]", &library(), &Default::default(), 0).unwrap_err();
        assert!(matches!(err, CliError::Schedule(_)));
    }

    #[test]
    fn test_functions_command() {
        let out: Value = serde_json::from_str(&functions_command().unwrap()).unwrap();
        assert_eq!(out["registered"], serde_json::json!(["fade_in", "fade_out"]));
        assert_eq!(out["scheduleFunctions"]["fade_out"]["direction"], "decrease");
        assert_eq!(out["templates"][0]["name"], "Basic Analogy");
        let curves = out["curves"].as_array().unwrap();
        assert_eq!(curves.len(), 6);
        assert_eq!(curves[4], serde_json::json!({"name": "ease_in_out", "label": "Ease In/Out"}));
    }

    #[test]
    fn test_library_indices_reach_schedules() {
        let (_, schedules, scheduler) =
            run_evaluation("[[ [man] @ fade_out(0.1, 0.9) ]]", &library(), &Default::default()).unwrap();
        assert_eq!(schedules[0].token_indices, vec![TokenIndex::Position(1)]);
        assert_eq!(scheduler.len(), 1);
    }
}
