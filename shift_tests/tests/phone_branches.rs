// End-to-end tests for the phone branches at service milestones.
//
// A milestone suspends admission when the served count hits its threshold,
// plays a timed phone sequence, and waits for the player's choice. Accepting
// resumes the queue; declining ends the shift badly and pauses the clock.

use night_brew_sim::command::ShopAction;
use night_brew_sim::config::{GameConfig, MilestoneConfig};
use night_brew_sim::display::Objective;
use night_brew_sim::ending::EndingKind;
use night_brew_sim::event::ShopEventKind;
use night_brew_sim::phone::{PhoneChoice, PhoneLine, PhoneMode, PhoneScript};
use night_brew_sim::types::{CupType, SimSpeed, SoundCue};
use shift_tests::{TestShop, called, coffee_regulars, count};

fn text_milestone(threshold: u32) -> MilestoneConfig {
    MilestoneConfig {
        threshold,
        mode: PhoneMode::Text {
            contact: "Unknown Number".to_string(),
            message: "are you still open?".to_string(),
        },
        script: PhoneScript {
            accept_lines: vec![
                PhoneLine::Player("yes".to_string()),
                PhoneLine::Contact("good".to_string()),
            ]
            .into(),
            decline_lines: vec![PhoneLine::Contact("oh".to_string())].into(),
        },
    }
}

// ---------------------------------------------------------------------------
// Test scenarios
// ---------------------------------------------------------------------------

#[test]
fn milestone_holds_next_customer_until_phone_is_answered() {
    let mut shop = TestShop::scripted(coffee_regulars(5), vec![text_milestone(3)]);
    for _ in 0..2 {
        shop.serve_next_customer();
    }
    let third = shop.serve_next_customer();
    assert_eq!(
        count(&third, |k| matches!(
            k,
            ShopEventKind::MilestoneReached { threshold: 3, customers_served: 3 }
        )),
        1
    );
    assert!(called(&third).is_empty());
    assert_eq!(*shop.sim.task_board.objective(), Objective::AnswerPhone);
    assert_eq!(
        count(&third, |k| matches!(k, ShopEventKind::Sound { cue: SoundCue::PhoneBuzz })),
        1
    );

    // Nobody is admitted while the phone waits, however long it takes.
    let shown = shop.wait_for_phone_prompt();
    assert_eq!(
        count(&shown, |k| matches!(
            k,
            ShopEventKind::PhoneMessageShown { text, .. } if text == "are you still open?"
        )),
        1
    );
    let idle = shop.run_for(60_000);
    assert!(called(&idle).is_empty());
    assert_eq!(shop.sim.register.current_customer(), None);

    let answered = shop.answer_phone(PhoneChoice::Accept);
    assert_eq!(
        count(&answered, |k| matches!(k, ShopEventKind::PhoneReply { .. })),
        2
    );
    assert_eq!(
        count(&answered, |k| matches!(
            k,
            ShopEventKind::PhoneClosed { choice: PhoneChoice::Accept }
        )),
        1
    );
    assert_eq!(called(&answered), vec!["Regular 3".to_string()]);
    assert_eq!(called(&shop.log).len(), 4);
}

#[test]
fn phone_sequence_follows_configured_timing() {
    let mut shop = TestShop::scripted(coffee_regulars(2), vec![text_milestone(1)]);
    shop.serve_next_customer();
    let branch_tick = shop.sim.tick;

    let shown = shop.wait_for_phone_prompt();
    let shown_at = shown
        .iter()
        .find(|e| matches!(e.kind, ShopEventKind::PhoneMessageShown { .. }))
        .map(|e| e.tick)
        .expect("message shown");
    let timing = shop.sim.config.phone_timing.clone();
    assert_eq!(shown_at, branch_tick + timing.notification_delay_ticks);

    let chosen_at = shop.sim.tick + 1;
    let answered = shop.answer_phone(PhoneChoice::Accept);
    let reply_ticks: Vec<u64> = answered
        .iter()
        .filter(|e| matches!(e.kind, ShopEventKind::PhoneReply { .. }))
        .map(|e| e.tick)
        .collect();
    assert_eq!(reply_ticks.len(), 2);
    assert_eq!(reply_ticks[1] - reply_ticks[0], timing.line_delay_ticks);
    assert_eq!(reply_ticks[0], chosen_at + timing.line_delay_ticks);
    let closed_at = answered
        .iter()
        .find(|e| matches!(e.kind, ShopEventKind::PhoneClosed { .. }))
        .map(|e| e.tick)
        .expect("phone closed");
    assert_eq!(closed_at - reply_ticks[1], timing.close_delay_ticks);
}

#[test]
fn choice_before_message_is_ignored() {
    let mut shop = TestShop::scripted(coffee_regulars(2), vec![text_milestone(1)]);
    shop.serve_next_customer();
    assert!(shop.sim.phone.is_active());
    assert!(!shop.sim.phone.is_awaiting_choice());

    shop.act(ShopAction::PhoneChoice {
        choice: PhoneChoice::Decline,
    });
    shop.wait_for_phone_prompt();
    assert!(shop.sim.phone.is_awaiting_choice());
    assert!(shop.sim.ending.reached().is_none());
}

#[test]
fn declining_ends_shift_and_freezes_time() {
    let mut shop = TestShop::scripted(coffee_regulars(3), vec![text_milestone(1)]);
    let first = shop.serve_next_customer();
    let regular = first
        .iter()
        .find_map(|e| match &e.kind {
            ShopEventKind::CustomerLeft { customer_id, .. } => Some(*customer_id),
            _ => None,
        })
        .expect("first regular left");
    shop.wait_for_phone_prompt();

    let declined = shop.answer_phone(PhoneChoice::Decline);
    assert_eq!(
        count(&declined, |k| matches!(
            k,
            ShopEventKind::EndingReached { kind: EndingKind::Bad, .. }
        )),
        1
    );
    assert_eq!(
        count(&declined, |k| matches!(k, ShopEventKind::Sound { cue: SoundCue::Sting })),
        1
    );
    assert!(called(&declined).is_empty());
    assert_eq!(shop.sim.speed, SimSpeed::Paused);
    assert_eq!(shop.sim.time_scale(), 0.0);
    assert_eq!(*shop.sim.task_board.objective(), Objective::None);

    // The leaving regular (if still inside) stops moving; no events fire.
    let frozen = shop.sim.customers.get(&regular).map(|c| c.agent.position);
    let later = shop.run_for(30_000);
    assert!(later.is_empty());
    assert_eq!(
        shop.sim.customers.get(&regular).map(|c| c.agent.position),
        frozen
    );

    let ignored = shop.act_all(vec![
        ShopAction::PickUpCup {
            cup_type: CupType::Coffee,
        },
        ShopAction::LeaveShop,
    ]);
    assert!(ignored.is_empty());
    assert_eq!(shop.sim.ending.reached(), Some(EndingKind::Bad));
}

#[test]
fn milestone_fires_once_even_if_count_is_rewound() {
    let mut shop = TestShop::scripted(coffee_regulars(3), vec![text_milestone(1)]);
    shop.serve_next_customer();
    shop.wait_for_phone_prompt();
    shop.answer_phone(PhoneChoice::Accept);

    shop.act(ShopAction::SetCustomersServed { count: 0 });
    let second = shop.serve_next_customer();
    assert_eq!(
        count(&second, |k| matches!(k, ShopEventKind::MilestoneReached { .. })),
        0
    );
    assert_eq!(called(&second), vec!["Regular 2".to_string()]);
    assert_eq!(
        count(&shop.log, |k| matches!(k, ShopEventKind::MilestoneReached { .. })),
        1
    );
}

#[test]
fn airdrop_milestone_chimes_and_shares_photo() {
    let mut shop = TestShop::new(42);
    for _ in 0..3 {
        shop.serve_next_customer();
    }
    assert_eq!(
        count(&shop.log, |k| matches!(
            k,
            ShopEventKind::PhoneNotification { cue: SoundCue::AirDropChime, sender } if sender == "Unknown iPhone"
        )),
        1
    );
    let shown = shop.wait_for_phone_prompt();
    assert_eq!(
        count(&shown, |k| matches!(
            k,
            ShopEventKind::PhoneMessageShown { text, .. }
                if text == "\"Unknown iPhone\" would like to share a photo."
        )),
        1
    );

    let answered = shop.answer_phone(PhoneChoice::Accept);
    assert_eq!(
        count(&answered, |k| matches!(
            k,
            ShopEventKind::PhoneReply { line: PhoneLine::Photo(photo) } if photo == "shop_window_from_outside"
        )),
        1
    );
}

#[test]
fn default_shift_runs_both_milestones_then_ends_well() {
    let mut shop = TestShop::with_config(5, GameConfig::default());
    for _ in 0..3 {
        shop.serve_next_customer();
    }
    shop.wait_for_phone_prompt();
    shop.answer_phone(PhoneChoice::Accept);
    for _ in 0..2 {
        shop.serve_next_customer();
    }
    shop.wait_for_phone_prompt();
    shop.answer_phone(PhoneChoice::Accept);
    shop.serve_next_customer();

    assert_eq!(*shop.sim.task_board.objective(), Objective::LeaveShop);
    shop.act(ShopAction::LeaveShop);
    assert_eq!(shop.sim.ending.reached(), Some(EndingKind::Good));
    assert_eq!(
        count(&shop.log, |k| matches!(k, ShopEventKind::MilestoneReached { .. })),
        2
    );
}
