/// Stage checklists and checklist-driven auto-closure
///
/// Every pipeline stage carries exactly three required steps, defined in a
/// static table (policy, not configuration). Items are lazily materialized
/// into storage the first time a deal's checklist is viewed for its current
/// stage; the (deal, stage, title) unique constraint keeps this idempotent.
///
/// Completing an item triggers auto-closure: open tasks of the same deal
/// whose title or description matches the item (per the pluggable
/// [`TaskMatcher`](super::matcher::TaskMatcher)) are moved to DONE. That
/// side effect is best-effort; the toggle itself never fails because of it.
///
/// The `checklist_complete` flag returned from a toggle is advisory, meant
/// for UI prompts to advance the stage. It never gates stage transitions.

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::matcher::TaskMatcher;
use super::{fire_and_forget, SideEffectError};
use crate::models::audit::{AppendAudit, AuditAction, AuditEvent};
use crate::models::checklist::ChecklistItem;
use crate::models::deal::Deal;
use crate::models::task::Task;

/// Required checklist titles for a pipeline stage
///
/// Unknown stages have no required steps and return an empty slice.
pub fn stage_checklist(stage: &str) -> &'static [&'static str] {
    match stage {
        "lead" => &[
            "Первичный контакт установлен",
            "Потребность выявлена",
            "Бюджет определен",
        ],
        "qualification" => &[
            "Квалификация проведена",
            "ЛПР определен",
            "Сроки согласованы",
        ],
        "proposal" => &[
            "КП отправлено",
            "Презентация проведена",
            "Обратная связь получена",
        ],
        "negotiation" => &[
            "Условия обсуждены",
            "Скидка согласована",
            "Договор подготовлен",
        ],
        "closed_won" => &[
            "Договор подписан",
            "Оплата получена",
            "Передано в работу",
        ],
        "closed_lost" => &[
            "Причина отказа зафиксирована",
            "Клиент в базе отказов",
            "Ретроспектива проведена",
        ],
        _ => &[],
    }
}

/// Completion summary for a deal's current-stage checklist
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistStatus {
    /// True when every required item is completed
    #[serde(rename = "checklistComplete")]
    pub checklist_complete: bool,

    /// Completed item count
    #[serde(rename = "completedCount")]
    pub completed_count: i64,

    /// Total item count
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

/// Result of a checklist toggle
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistToggle {
    /// The toggled item
    pub item: ChecklistItem,

    /// Recomputed completion for the deal's current stage
    #[serde(flatten)]
    pub status: ChecklistStatus,
}

/// Materializes the required items for a deal's stage and returns them
///
/// Idempotent: titles already present are left untouched, so repeated views
/// never duplicate rows.
pub async fn materialize(
    pool: &PgPool,
    deal_id: Uuid,
    stage: &str,
) -> Result<Vec<ChecklistItem>, sqlx::Error> {
    for title in stage_checklist(stage) {
        ChecklistItem::insert_missing(pool, deal_id, stage, title).await?;
    }

    ChecklistItem::list_for_stage(pool, deal_id, stage).await
}

/// Recomputes the completion summary for a deal's stage
pub async fn status(
    pool: &PgPool,
    deal_id: Uuid,
    stage: &str,
) -> Result<ChecklistStatus, sqlx::Error> {
    let (completed_count, total_count) =
        ChecklistItem::completion_counts(pool, deal_id, stage).await?;

    Ok(ChecklistStatus {
        checklist_complete: total_count > 0 && completed_count == total_count,
        completed_count,
        total_count,
    })
}

/// Toggles a checklist item on the deal's current stage
///
/// Find-or-creates the row, flips the completed flag (stamping or clearing
/// the completer identity), appends a CHECK/UNCHECK audit event, runs
/// auto-closure as a fire-and-forget side effect when completing, and
/// returns the item with the recomputed completion summary.
pub async fn toggle_item(
    pool: &PgPool,
    matcher: &dyn TaskMatcher,
    actor_id: Uuid,
    deal: &Deal,
    title: &str,
    completed: bool,
) -> Result<ChecklistToggle, sqlx::Error> {
    ChecklistItem::insert_missing(pool, deal.id, &deal.stage, title).await?;

    let item = ChecklistItem::find(pool, deal.id, &deal.stage, title)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let item = ChecklistItem::set_completed(pool, item.id, completed, actor_id).await?;

    let action = if completed {
        AuditAction::Check
    } else {
        AuditAction::Uncheck
    };
    AuditEvent::record(
        pool,
        AppendAudit {
            workspace_id: deal.workspace_id,
            actor_id: Some(actor_id),
            entity_type: "checklist_item",
            entity_id: item.id,
            action,
            payload: json!({
                "dealId": deal.id,
                "stage": deal.stage,
                "title": title,
                "completed": completed,
            }),
        },
    )
    .await;

    if completed {
        fire_and_forget(
            "checklist auto-closure",
            auto_close_matching_tasks(pool, matcher, actor_id, deal, title),
        )
        .await;
    }

    let status = status(pool, deal.id, &deal.stage).await?;

    Ok(ChecklistToggle { item, status })
}

/// Closes open tasks on the deal that match a completed checklist item
///
/// Each closed task gets an UPDATE audit event tagged `autoClosed: true`.
async fn auto_close_matching_tasks(
    pool: &PgPool,
    matcher: &dyn TaskMatcher,
    actor_id: Uuid,
    deal: &Deal,
    item_title: &str,
) -> Result<(), SideEffectError> {
    let open_tasks = Task::list_open_by_deal(pool, deal.id).await?;

    for task in open_tasks {
        if !matcher.matches(item_title, &task.title, task.description.as_deref()) {
            continue;
        }

        Task::mark_done(pool, task.id).await?;

        tracing::debug!(task_id = %task.id, deal_id = %deal.id, "Auto-closed task");

        AuditEvent::record(
            pool,
            AppendAudit {
                workspace_id: deal.workspace_id,
                actor_id: Some(actor_id),
                entity_type: "task",
                entity_id: task.id,
                action: AuditAction::Update,
                payload: json!({
                    "autoClosed": true,
                    "checklistItem": item_title,
                    "status": "DONE",
                }),
            },
        )
        .await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deal::PIPELINE_STAGES;

    #[test]
    fn test_every_stage_has_exactly_three_items() {
        for stage in PIPELINE_STAGES {
            assert_eq!(
                stage_checklist(stage).len(),
                3,
                "stage {} must have 3 checklist items",
                stage
            );
        }
    }

    #[test]
    fn test_unknown_stage_has_no_items() {
        assert!(stage_checklist("archived").is_empty());
        assert!(stage_checklist("").is_empty());
        assert!(stage_checklist("LEAD").is_empty());
    }

    #[test]
    fn test_lead_checklist_content() {
        assert_eq!(
            stage_checklist("lead"),
            &[
                "Первичный контакт установлен",
                "Потребность выявлена",
                "Бюджет определен",
            ]
        );
    }

    #[test]
    fn test_negotiation_checklist_content() {
        assert_eq!(
            stage_checklist("negotiation"),
            &[
                "Условия обсуждены",
                "Скидка согласована",
                "Договор подготовлен",
            ]
        );
    }

    #[test]
    fn test_titles_are_unique_within_a_stage() {
        for stage in PIPELINE_STAGES {
            let titles = stage_checklist(stage);
            for (i, a) in titles.iter().enumerate() {
                for b in &titles[i + 1..] {
                    assert_ne!(a, b, "duplicate checklist title in stage {}", stage);
                }
            }
        }
    }
}
