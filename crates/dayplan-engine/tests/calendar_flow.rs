//! Calendar tab: date selection, per-date task loading and adding from a date.

mod common;

use std::time::Duration;

use common::{session_on, ymd, TestService};
use dayplan_core::{DayplanError, ItemKind, TabState, YearMonth};
use dayplan_engine::{
    CalendarRender, CalendarView, EngineError, Intent, ModalState, NoticeLevel, RefreshOutcome,
    UiEvent,
};

#[tokio::test]
async fn entering_calendar_shows_week_and_loads_today() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 10)).await;
    svc.seed_task("Dentist", Some(ymd(2024, 3, 10))).await;
    svc.seed_task("Gym", Some(ymd(2024, 3, 11))).await;
    svc.seed_task("Someday", None).await;

    session.switch_tab(TabState::Calendar).await.unwrap();

    assert_eq!(session.calendar().view(), CalendarView::Week);
    let loaded = session.calendar().date_tasks();
    assert_eq!(loaded.date, Some(ymd(2024, 3, 10)));
    assert_eq!(loaded.tasks.len(), 1);
    assert_eq!(loaded.tasks[0].title, "Dentist");
    // The main lists are not touched by a date fetch.
    assert_eq!(session.store().snapshot().revision, 0);
}

#[tokio::test]
async fn picking_a_month_day_loads_its_week() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 1)).await;
    svc.seed_task("Taxes", Some(ymd(2024, 3, 15))).await;
    session.switch_tab(TabState::Calendar).await.unwrap();
    session.show_month();
    let mut events = session.subscribe_events();

    session.select_month_day(15).await.unwrap();

    assert_eq!(svc.task_dates().last(), Some(&Some(ymd(2024, 3, 15))));
    match session.calendar().render() {
        CalendarRender::Week(strip) => {
            assert_eq!(strip.start(), Some(ymd(2024, 3, 11)));
            assert_eq!(strip.end(), Some(ymd(2024, 3, 17)));
        }
        other => panic!("expected week strip, got {other:?}"),
    }
    assert_eq!(session.calendar().date_tasks().tasks[0].title, "Taxes");
    assert_eq!(
        events.try_recv().unwrap(),
        UiEvent::CalendarViewChanged(CalendarView::Week)
    );
}

#[tokio::test]
async fn day_outside_month_is_rejected_without_fetch() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2023, 2, 1)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();
    session.show_month();
    let fetches = svc.calls("list_tasks");

    let err = session.select_month_day(30).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Invalid(DayplanError::DayOutOfRange { day: 30, .. })
    ));
    assert_eq!(svc.calls("list_tasks"), fetches);
    assert_eq!(session.calendar().view(), CalendarView::Month);
}

#[tokio::test]
async fn week_strip_selection_fetches_that_date() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 10)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();

    session
        .dispatch(Intent::DaySelected {
            date: ymd(2024, 3, 8),
        })
        .await
        .unwrap();

    assert_eq!(session.calendar().cursor().selected_date, ymd(2024, 3, 8));
    assert_eq!(svc.task_dates().last(), Some(&Some(ymd(2024, 3, 8))));
}

#[tokio::test]
async fn paging_months_then_resetting_to_today() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 12, 20)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();
    session.show_month();

    assert_eq!(
        session.change_period(1).unwrap(),
        YearMonth::new(2025, 1).unwrap()
    );
    assert_eq!(
        session.change_period(-13).unwrap(),
        YearMonth::new(2023, 12).unwrap()
    );
    assert_eq!(session.calendar().cursor().selected_date, ymd(2024, 12, 20));

    let render = session.reset_to_today().await.unwrap();

    match render {
        CalendarRender::Month(grid) => {
            assert_eq!(grid.month, YearMonth::new(2024, 12).unwrap());
            assert_eq!(grid.today(), Some(ymd(2024, 12, 20)));
        }
        other => panic!("expected month grid, got {other:?}"),
    }
    assert_eq!(svc.task_dates().last(), Some(&Some(ymd(2024, 12, 20))));
}

#[tokio::test]
async fn dispatched_paging_and_reset_notify_observers() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 12, 20)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();
    let mut state = session.calendar().subscribe_state();

    session
        .dispatch(Intent::ChangePeriod { offset: 2 })
        .await
        .unwrap();

    assert!(state.has_changed().unwrap());
    let paged = *state.borrow_and_update();
    assert_eq!(paged.cursor.view_month, YearMonth::new(2025, 2).unwrap());
    assert_eq!(paged.cursor.selected_date, ymd(2024, 12, 20));

    session.dispatch(Intent::ResetToToday).await.unwrap();

    assert!(state.has_changed().unwrap());
    let reset = *state.borrow_and_update();
    assert_eq!(reset.cursor.view_month, YearMonth::new(2024, 12).unwrap());
    assert_eq!(reset.view, CalendarView::Week);
}

#[tokio::test]
async fn paging_past_the_date_range_is_reported() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 10)).await;
    let state = session.calendar().subscribe_state();
    let before = session.calendar().cursor();

    let err = session
        .dispatch(Intent::ChangePeriod { offset: i32::MAX })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Invalid(DayplanError::MonthOutOfRange { .. })
    ));
    assert_eq!(session.calendar().cursor(), before);
    assert!(!state.has_changed().unwrap());
    assert_eq!(
        session.notices().current().map(|n| n.level),
        Some(NoticeLevel::Error)
    );
}

#[tokio::test]
async fn adding_from_calendar_uses_selected_date() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 1)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();
    session.select_month_day(15).await.unwrap();

    let modal = session.open_add(ItemKind::Task);
    assert_eq!(
        modal,
        ModalState::Add {
            kind: ItemKind::Task,
            date: Some(ymd(2024, 3, 15)),
        }
    );
    session.save("Taxes").await.unwrap();

    assert_eq!(svc.inner().task(1).unwrap().date, Some(ymd(2024, 3, 15)));
    let loaded = session.calendar().date_tasks();
    assert_eq!(loaded.date, Some(ymd(2024, 3, 15)));
    assert_eq!(loaded.tasks.len(), 1);
}

#[tokio::test]
async fn habits_added_from_calendar_carry_no_date() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 1)).await;
    session.switch_tab(TabState::Calendar).await.unwrap();

    let modal = session.open_add(ItemKind::Habit);

    assert_eq!(
        modal,
        ModalState::Add {
            kind: ItemKind::Habit,
            date: None,
        }
    );
}

#[tokio::test]
async fn adding_outside_calendar_has_no_date() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 1)).await;

    let modal = session.open_add(ItemKind::Task);

    assert_eq!(
        modal,
        ModalState::Add {
            kind: ItemKind::Task,
            date: None,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn slow_date_fetch_is_dropped_for_newer_selection() {
    let svc = TestService::new();
    let session = session_on(&svc, ymd(2024, 3, 10)).await;
    svc.seed_task("Old day", Some(ymd(2024, 3, 11))).await;
    svc.seed_task("New day", Some(ymd(2024, 3, 12))).await;
    session.calendar().select_date(ymd(2024, 3, 11));
    svc.delay_reads(&[Duration::from_millis(500), Duration::ZERO]);

    let (slow, fast) = tokio::join!(session.select_date(ymd(2024, 3, 11)), async {
        tokio::task::yield_now().await;
        session.select_date(ymd(2024, 3, 12)).await
    });

    assert_eq!(slow.unwrap(), RefreshOutcome::Superseded);
    assert!(matches!(fast.unwrap(), RefreshOutcome::Applied { .. }));
    let loaded = session.calendar().date_tasks();
    assert_eq!(loaded.date, Some(ymd(2024, 3, 12)));
    assert_eq!(loaded.tasks[0].title, "New day");
}
