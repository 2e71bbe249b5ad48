use crate::infra::seed_mothers;
use clap::Args;
use kannamma::config::CampaignConfig;
use kannamma::error::AppError;
use kannamma::workflows::campaign::{
    run_single_call, CallTarget, CampaignEngine, MenuKey, MockCallProvider, DEFAULT_PROMPT_DELAY,
};
use kannamma::workflows::mothers::{
    assess, mask_phone, InMemoryMotherRepository, MotherProfile, MotherRecord,
    MotherRegistryService, RiskAssessment, RiskGroups,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Ring each call for the configured 500-1000 ms instead of resolving instantly.
    #[arg(long)]
    pub(crate) realistic_delays: bool,
    /// Number of recent call log entries to print after the campaign.
    #[arg(long, default_value_t = 5)]
    pub(crate) log_limit: usize,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Free-text medical conditions, e.g. "High BP, Diabetes"
    #[arg(long, default_value = "")]
    pub(crate) conditions: String,
    /// Age in years
    #[arg(long)]
    pub(crate) age: i32,
    /// Pregnancy number (1 for a first pregnancy)
    #[arg(long)]
    pub(crate) pregnancy_number: u32,
    /// Weight in kilograms
    #[arg(long)]
    pub(crate) weight: f32,
    /// Free-text notes on complications in earlier pregnancies
    #[arg(long, default_value = "")]
    pub(crate) complications: String,
    /// Consecutive unanswered outreach calls
    #[arg(long, default_value_t = 0)]
    pub(crate) missed_calls: u32,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let profile = MotherProfile {
        medical_conditions: args.conditions,
        age: args.age,
        pregnancy_number: args.pregnancy_number,
        weight_kg: args.weight,
        previous_complications: args.complications,
    };
    let assessment = assess(&profile, args.missed_calls);
    render_assessment(&assessment);
    Ok(())
}

fn render_assessment(assessment: &RiskAssessment) {
    println!(
        "Risk label: {} (score {})",
        assessment.label.label(),
        assessment.total_score
    );
    if assessment.components.is_empty() {
        println!("  No risk factors present");
        return;
    }
    for component in &assessment.components {
        println!(
            "  +{} {:?}: {}",
            component.points, component.factor, component.notes
        );
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let registry = MotherRegistryService::new(Arc::new(InMemoryMotherRepository::default()));
    seed_mothers(&registry)?;

    println!("Maternal outreach demo");
    println!("\nDashboard before the campaign");
    render_groups(&registry.risk_groups()?);

    let provider = if args.realistic_delays {
        MockCallProvider::from_config(&CampaignConfig::default())
    } else {
        MockCallProvider::instant()
    };
    let engine = CampaignEngine::new(Arc::new(provider));

    let targets = registry.campaign_targets(None)?;
    println!("\nCalling {} mothers", targets.len());
    let Some(results) = engine.start(targets).wait().await else {
        println!("  Campaign ended before completion");
        return Ok(());
    };

    for entry in results.iter() {
        println!("  {:<8} {}", entry.mother_id, entry.outcome.label());
    }
    let summary = results.summary();
    println!(
        "  Answered: {}  No Answer: {}  Not Taken: {}",
        summary.answered, summary.no_answer, summary.alert_acknowledged
    );

    let reconciliation = registry.apply_campaign_results(&results);
    for skipped in &reconciliation.skipped {
        println!("  Skipped {}: {}", skipped.mother_id, skipped.reason);
    }

    if let Some(record) = registry.flagged(true)?.into_iter().next() {
        let prompt_delay = if args.realistic_delays {
            DEFAULT_PROMPT_DELAY
        } else {
            Duration::ZERO
        };
        println!("\nFollow-up call to {} (presses 2)", record.name);
        match run_single_call(CallTarget::from(&record), prompt_delay, async { MenuKey::Two }).await
        {
            Ok(outcome) => {
                registry.apply_call_outcome(&record.id, outcome)?;
                println!("  {}", outcome.label());
            }
            Err(err) => println!("  Call failed: {}", err),
        }
    }

    println!("\nDashboard after the campaign");
    render_groups(&registry.risk_groups()?);

    let logs = registry.call_logs(args.log_limit)?;
    println!("\nRecent calls");
    for entry in logs {
        println!(
            "  {} {:<12} {}",
            entry.logged_at.format("%H:%M:%S"),
            entry.masked_phone,
            entry.outcome.label()
        );
    }

    Ok(())
}

fn render_groups(groups: &RiskGroups) {
    for (title, records) in [
        ("Red", &groups.red),
        ("Yellow", &groups.yellow),
        ("Green", &groups.green),
    ] {
        println!("  {title} ({})", records.len());
        for record in records {
            render_record(record);
        }
    }
}

fn render_record(record: &MotherRecord) {
    let mut markers = Vec::new();
    if record.flagged {
        markers.push("flagged");
    }
    if record.visited {
        markers.push("visited");
    }
    println!(
        "    {:<14} {:<12} last call: {:<12} missed: {} {}",
        record.name,
        mask_phone(&record.contact.phone),
        record.last_call_status().label(),
        record.consecutive_missed_calls(),
        markers.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_completes_with_instant_calls() {
        run_demo(DemoArgs::default()).await.expect("demo runs");
    }

    #[test]
    fn classify_accepts_minimal_profile() {
        let args = ClassifyArgs {
            conditions: "Diabetes".to_string(),
            age: 30,
            pregnancy_number: 2,
            weight: 60.0,
            complications: String::new(),
            missed_calls: 0,
        };
        run_classify(args).expect("classification prints");
    }
}
