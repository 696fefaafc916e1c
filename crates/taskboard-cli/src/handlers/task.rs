use crate::cli::{TaskAction, TaskCreateArgs, TaskEditArgs};
use crate::context::CliContext;
use crate::output;
use anyhow::bail;
use std::collections::HashSet;
use taskboard_domain::{parse_due_date, ColumnId, Task, TaskDraft, TaskId};
use taskboard_sync::{Intent, Resolution, SyncClient};

pub async fn handle(ctx: &CliContext, action: TaskAction) -> anyhow::Result<()> {
    let mut client = ctx.connect().await?;

    match action {
        TaskAction::List => output::output_success(client.reconciler().board().columns()),
        TaskAction::Canceled => output::output_list(client.reconciler().board().canceled().to_vec()),
        TaskAction::Create(args) => create(&mut client, args).await,
        TaskAction::Edit(args) => edit(&mut client, args).await,
        TaskAction::Move { id, to } => {
            let task_id = TaskId::new(id);
            run(&mut client, Intent::ChangeStatus { task_id: task_id.clone(), to }).await?;
            output_task(&client, &task_id)
        }
        TaskAction::Reorder { column, from, to } => {
            run(
                &mut client,
                Intent::Reorder {
                    column,
                    old_index: from,
                    new_index: to,
                },
            )
            .await?;
            let order: Vec<&TaskId> = client
                .reconciler()
                .board()
                .column(column)
                .iter()
                .map(|t| &t.id)
                .collect();
            output::output_success(serde_json::json!({
                "column": column,
                "order": order,
                "persisted": false,
            }))
        }
        TaskAction::Cancel { id } => {
            let task_id = TaskId::new(id);
            run(&mut client, Intent::Cancel { task_id: task_id.clone() }).await?;
            output::output_success(serde_json::json!({ "canceled": task_id }))
        }
        TaskAction::Resume { id } => {
            let task_id = TaskId::new(id);
            run(&mut client, Intent::Resume { task_id: task_id.clone() }).await?;
            output_task(&client, &task_id)
        }
        TaskAction::Delete { id } => {
            let task_id = TaskId::new(id);
            run(&mut client, Intent::Delete { task_id: task_id.clone() }).await?;
            output::output_success(serde_json::json!({ "deleted": task_id }))
        }
        TaskAction::Check { id, index } => {
            let task_id = TaskId::new(id);
            run(
                &mut client,
                Intent::ToggleChecklistItem {
                    task_id: task_id.clone(),
                    index,
                },
            )
            .await?;
            output_task(&client, &task_id)
        }
    }
}

/// Execute an intent and turn a reverted mutation into an error.
async fn run(client: &mut SyncClient, intent: Intent) -> anyhow::Result<()> {
    match client.execute(intent).await? {
        Resolution::Committed => Ok(()),
        Resolution::RolledBack { reason } | Resolution::Discarded { reason } => bail!(reason),
        Resolution::Unknown => bail!("request was not tracked"),
    }
}

fn output_task(client: &SyncClient, task_id: &TaskId) -> anyhow::Result<()> {
    match client.reconciler().board().find(task_id) {
        Some(task) => output::output_success(task),
        None => bail!("Task {} not found", task_id),
    }
}

async fn create(client: &mut SyncClient, args: TaskCreateArgs) -> anyhow::Result<()> {
    let mut draft = TaskDraft::new(args.title);
    if let Some(description) = args.description {
        draft = draft.with_description(description);
    }
    if let Some(due_date) = args.due_date {
        draft = draft.with_due_date(parse_due_date(&due_date)?);
    }

    let before: HashSet<TaskId> = client.reconciler().board().task_ids().cloned().collect();
    run(client, Intent::Create(draft)).await?;

    let created: Option<&Task> = client
        .reconciler()
        .board()
        .column(ColumnId::ToDo)
        .iter()
        .find(|t| !before.contains(&t.id) && !t.id.is_temporary());
    match created {
        Some(task) => output::output_success(task),
        None => bail!("created task is missing from the board"),
    }
}

async fn edit(client: &mut SyncClient, args: TaskEditArgs) -> anyhow::Result<()> {
    let task_id = TaskId::new(args.id);
    let Some(task) = client.reconciler().board().find(&task_id) else {
        bail!("Task {} not found", task_id);
    };

    let mut draft = task.to_draft();
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(description) = args.description {
        draft.description = Some(description);
    }
    if args.clear_due_date {
        draft.due_date = None;
    } else if let Some(due_date) = args.due_date {
        draft.due_date = Some(parse_due_date(&due_date)?);
    }

    run(
        client,
        Intent::Edit {
            task_id: task_id.clone(),
            draft,
        },
    )
    .await?;
    output_task(client, &task_id)
}
