use taskboard_domain::*;

fn task(id: &str) -> Task {
    Task::new(TaskId::from(id), format!("Task {}", id))
}

fn board(todo: &[&str], doing: &[&str], done: &[&str]) -> BoardState {
    BoardState::from_columns(BoardColumns {
        todo: todo.iter().map(|id| task(id)).collect(),
        doing: doing.iter().map(|id| task(id)).collect(),
        done: done.iter().map(|id| task(id)).collect(),
    })
}

fn ids(board: &BoardState, column: ColumnId) -> Vec<String> {
    board
        .column(column)
        .iter()
        .map(|t| t.id.to_string())
        .collect()
}

fn id(value: &str) -> TaskId {
    TaskId::from(value)
}

#[test]
fn test_drag_to_other_column_previews_and_emits_status_change() {
    let mut board = board(&["T1", "T2"], &[], &[]);
    let original = board.clone();
    let mut drag = DragController::new();

    drag.start(&board, &id("T1")).unwrap();
    drag.hover(&mut board, &DropTarget::Column(ColumnId::Doing))
        .unwrap();

    assert_eq!(ids(&board, ColumnId::ToDo), vec!["T2"]);
    assert_eq!(ids(&board, ColumnId::Doing), vec!["T1"]);

    let outcome = drag
        .release(&mut board, Some(&DropTarget::Column(ColumnId::Doing)))
        .unwrap()
        .expect("status change expected");
    assert_eq!(
        outcome.intent,
        DragIntent::StatusChange {
            task_id: id("T1"),
            from: ColumnId::ToDo,
            to: ColumnId::Doing,
        }
    );
    assert_eq!(outcome.origin.state(), &original);
    assert!(!drag.is_dragging());
}

#[test]
fn test_reorder_within_column() {
    let mut board = board(&["T1", "T2"], &[], &[]);
    let mut drag = DragController::new();

    drag.start(&board, &id("T1")).unwrap();
    let outcome = drag
        .release(&mut board, Some(&DropTarget::Task(id("T2"))))
        .unwrap()
        .expect("reorder expected");

    assert_eq!(ids(&board, ColumnId::ToDo), vec!["T2", "T1"]);
    assert_eq!(
        outcome.intent,
        DragIntent::Reorder {
            column: ColumnId::ToDo,
            old_index: 0,
            new_index: 1,
        }
    );
}

#[test]
fn test_drop_onto_task_takes_its_index() {
    let mut board = board(&["A", "B", "C", "D"], &[], &[]);
    let mut drag = DragController::new();

    drag.start(&board, &id("D")).unwrap();
    let outcome = drag
        .release(&mut board, Some(&DropTarget::Task(id("B"))))
        .unwrap()
        .unwrap();

    assert_eq!(ids(&board, ColumnId::ToDo), vec!["A", "D", "B", "C"]);
    assert_eq!(
        outcome.intent,
        DragIntent::Reorder {
            column: ColumnId::ToDo,
            old_index: 3,
            new_index: 1,
        }
    );
}

#[test]
fn test_drop_onto_task_in_other_column_pushes_it_down() {
    let mut board = board(&["A"], &["X", "Y"], &[]);
    let mut drag = DragController::new();

    drag.start(&board, &id("A")).unwrap();
    drag.release(&mut board, Some(&DropTarget::Task(id("Y"))))
        .unwrap()
        .unwrap();

    assert_eq!(ids(&board, ColumnId::Doing), vec!["X", "A", "Y"]);
    assert!(board.column(ColumnId::ToDo).is_empty());
}

#[test]
fn test_cross_column_move_into_empty_column_from_any_index() {
    for source_index in 0..3 {
        let mut board = board(&["a", "b", "c"], &[], &[]);
        let dragged = board.column(ColumnId::ToDo)[source_index].id.clone();
        let mut drag = DragController::new();

        drag.start(&board, &dragged).unwrap();
        drag.release(&mut board, Some(&DropTarget::Column(ColumnId::Done)))
            .unwrap()
            .unwrap();

        assert_eq!(board.column(ColumnId::Done).len(), 1);
        assert_eq!(board.column(ColumnId::Done)[0].id, dragged);
        assert!(!board.column(ColumnId::ToDo).iter().any(|t| t.id == dragged));
        assert_eq!(board.column(ColumnId::ToDo).len(), 2);
    }
}

#[test]
fn test_only_release_position_decides_intent() {
    let mut board = board(&["T1", "T2", "T3"], &["D1"], &[]);
    let mut drag = DragController::new();

    drag.start(&board, &id("T1")).unwrap();
    drag.hover(&mut board, &DropTarget::Column(ColumnId::Doing))
        .unwrap();
    drag.hover(&mut board, &DropTarget::Column(ColumnId::Done))
        .unwrap();
    assert!(board.check_invariants().is_ok());
    drag.hover(&mut board, &DropTarget::Task(id("T3")))
        .unwrap();

    let outcome = drag
        .release(&mut board, Some(&DropTarget::Task(id("T3"))))
        .unwrap()
        .unwrap();

    assert_eq!(ids(&board, ColumnId::ToDo), vec!["T2", "T1", "T3"]);
    assert_eq!(
        outcome.intent,
        DragIntent::Reorder {
            column: ColumnId::ToDo,
            old_index: 0,
            new_index: 1,
        }
    );
    assert_eq!(ids(&board, ColumnId::Doing), vec!["D1"]);
    assert!(board.column(ColumnId::Done).is_empty());
}

#[test]
fn test_cancel_restores_gesture_start() {
    let mut board = board(&["T1", "T2"], &["D1"], &[]);
    let original = board.clone();
    let mut drag = DragController::new();

    drag.start(&board, &id("T2")).unwrap();
    drag.hover(&mut board, &DropTarget::Task(id("D1")))
        .unwrap();
    drag.hover(&mut board, &DropTarget::Column(ColumnId::Done))
        .unwrap();
    assert_ne!(board, original);

    drag.cancel(&mut board).unwrap();
    assert_eq!(board, original);
    assert!(!drag.is_dragging());
}

#[test]
fn test_release_outside_targets_cancels() {
    let mut board = board(&["T1"], &[], &[]);
    let original = board.clone();
    let mut drag = DragController::new();

    drag.start(&board, &id("T1")).unwrap();
    drag.hover(&mut board, &DropTarget::Column(ColumnId::Done))
        .unwrap();
    let outcome = drag.release(&mut board, None).unwrap();

    assert!(outcome.is_none());
    assert_eq!(board, original);
}

#[test]
fn test_upsert_is_idempotent() {
    let mut board = board(&["1", "2"], &["3"], &[]);
    let mut edited = task("3");
    edited.title = "Renamed".to_string();

    board.upsert_task(edited.clone());
    let after_first = board.clone();
    board.upsert_task(edited);
    assert_eq!(board, after_first);
}

#[test]
fn test_every_task_in_exactly_one_place_after_mutations() {
    let mut board = board(&["1", "2", "3"], &["4"], &["5"]);
    board.move_task(&id("1"), ColumnId::ToDo, ColumnId::Done, 0);
    board.reorder_task(ColumnId::ToDo, 0, 1);
    board.cancel_task(&id("4"));
    board.upsert_task(task("6"));
    board.remove_task(&id("5"));
    board.resume_task(&id("4"));

    assert!(board.check_invariants().is_ok());
    let mut all: Vec<String> = board.task_ids().map(|id| id.to_string()).collect();
    all.sort();
    assert_eq!(all, vec!["1", "2", "3", "4", "6"]);
}
