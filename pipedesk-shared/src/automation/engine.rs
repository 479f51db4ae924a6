/// Task-template automation engine
///
/// Reacts to deal lifecycle events by materializing task templates into
/// tasks:
///
/// - `DEAL_CREATED` fires once, immediately after a deal is persisted,
///   whatever its initial stage
/// - `DEAL_STAGE_CHANGED` fires when an update moves a deal to a stage
///   different from its previous one; the new stage is the match key
///
/// Generated tasks copy the template's title, description and initial
/// status, compute `due_at = now + due_days` when the template sets an
/// offset, and inherit the triggering deal's client and assignee. One audit
/// CREATE event is appended per generated task, tagged `autoCreated: true`.
///
/// Callers invoke the engine through
/// [`fire_and_forget`](super::fire_and_forget): a failing template run is
/// logged and can never roll back the deal mutation that triggered it.

use chrono::{Duration, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use super::SideEffectError;
use crate::models::audit::{AppendAudit, AuditAction, AuditEvent};
use crate::models::deal::Deal;
use crate::models::task::{CreateTask, Task, TaskStatus};
use crate::models::task_template::{TaskTemplate, TriggerKind, UpsertTaskTemplate};

/// Runs DEAL_CREATED automation for a freshly persisted deal
pub async fn run_deal_created(
    pool: &PgPool,
    actor_id: Uuid,
    deal: &Deal,
) -> Result<(), SideEffectError> {
    materialize_templates(pool, actor_id, deal, TriggerKind::DealCreated, None).await
}

/// Runs DEAL_STAGE_CHANGED automation after a stage transition
///
/// The caller is responsible for only invoking this when the stage actually
/// changed; `deal` is the post-update row, so its stage is the match key.
pub async fn run_stage_changed(
    pool: &PgPool,
    actor_id: Uuid,
    deal: &Deal,
) -> Result<(), SideEffectError> {
    let stage = deal.stage.clone();
    materialize_templates(
        pool,
        actor_id,
        deal,
        TriggerKind::DealStageChanged,
        Some(&stage),
    )
    .await
}

async fn materialize_templates(
    pool: &PgPool,
    actor_id: Uuid,
    deal: &Deal,
    kind: TriggerKind,
    trigger_value: Option<&str>,
) -> Result<(), SideEffectError> {
    let templates =
        TaskTemplate::find_for_trigger(pool, deal.workspace_id, kind, trigger_value).await?;

    if templates.is_empty() {
        return Ok(());
    }

    tracing::debug!(
        deal_id = %deal.id,
        trigger = kind.as_str(),
        count = templates.len(),
        "Materializing task templates"
    );

    for template in templates {
        let due_at = template
            .due_days
            .map(|days| Utc::now() + Duration::days(days as i64));

        let task = Task::create(
            pool,
            deal.workspace_id,
            CreateTask {
                title: template.title.clone(),
                description: template.description.clone(),
                status: template.initial_status,
                due_at,
                deal_id: Some(deal.id),
                client_id: deal.client_id,
                assignee_id: deal.assignee_id,
            },
        )
        .await?;

        AuditEvent::record(
            pool,
            AppendAudit {
                workspace_id: deal.workspace_id,
                actor_id: Some(actor_id),
                entity_type: "task",
                entity_id: task.id,
                action: AuditAction::Create,
                payload: json!({
                    "autoCreated": true,
                    "templateId": template.id,
                    "trigger": kind.as_str(),
                    "triggerValue": trigger_value,
                    "dealId": deal.id,
                }),
            },
        )
        .await;
    }

    Ok(())
}

/// Computes the deterministic id for a seeded template
///
/// SHA-256 over (workspace_id, trigger kind, trigger value), truncated to 16
/// bytes. The same (workspace, trigger) combination always maps to the same
/// id, which is what makes [`seed_default_templates`] idempotent.
pub fn template_seed_id(workspace_id: Uuid, kind: TriggerKind, trigger_value: Option<&str>) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(workspace_id.as_bytes());
    hasher.update(kind.as_str().as_bytes());
    if let Some(value) = trigger_value {
        hasher.update(value.as_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Seeds a workspace with the default task templates
///
/// One DEAL_CREATED template and one DEAL_STAGE_CHANGED template per
/// mid-pipeline stage. Upserts are keyed by [`template_seed_id`], so
/// re-seeding never duplicates.
pub async fn seed_default_templates(
    pool: &PgPool,
    workspace_id: Uuid,
) -> Result<(), sqlx::Error> {
    let defaults: [(TriggerKind, Option<&str>, &str, &str, i32); 4] = [
        (
            TriggerKind::DealCreated,
            None,
            "Первичный контакт",
            "Связаться с клиентом по новой сделке",
            1,
        ),
        (
            TriggerKind::DealStageChanged,
            Some("qualification"),
            "Провести квалификацию",
            "Выяснить потребность, бюджет и сроки",
            2,
        ),
        (
            TriggerKind::DealStageChanged,
            Some("proposal"),
            "Подготовить коммерческое предложение",
            "Составить и отправить КП клиенту",
            3,
        ),
        (
            TriggerKind::DealStageChanged,
            Some("negotiation"),
            "Согласовать условия сделки",
            "Обсудить условия, скидки и договор",
            5,
        ),
    ];

    for (kind, trigger_value, title, description, due_days) in defaults {
        TaskTemplate::upsert(
            pool,
            workspace_id,
            UpsertTaskTemplate {
                id: template_seed_id(workspace_id, kind, trigger_value),
                trigger_kind: kind,
                trigger_value: trigger_value.map(String::from),
                title: title.to_string(),
                description: Some(description.to_string()),
                due_days: Some(due_days),
                initial_status: TaskStatus::Todo,
            },
        )
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_seed_id_is_stable() {
        let workspace_id = Uuid::from_u128(42);

        let a = template_seed_id(workspace_id, TriggerKind::DealCreated, None);
        let b = template_seed_id(workspace_id, TriggerKind::DealCreated, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_template_seed_id_diverges_per_trigger() {
        let workspace_id = Uuid::from_u128(42);

        let created = template_seed_id(workspace_id, TriggerKind::DealCreated, None);
        let qualification = template_seed_id(
            workspace_id,
            TriggerKind::DealStageChanged,
            Some("qualification"),
        );
        let proposal = template_seed_id(
            workspace_id,
            TriggerKind::DealStageChanged,
            Some("proposal"),
        );

        assert_ne!(created, qualification);
        assert_ne!(qualification, proposal);
    }

    #[test]
    fn test_template_seed_id_diverges_per_workspace() {
        let a = template_seed_id(Uuid::from_u128(1), TriggerKind::DealCreated, None);
        let b = template_seed_id(Uuid::from_u128(2), TriggerKind::DealCreated, None);
        assert_ne!(a, b);
    }
}
