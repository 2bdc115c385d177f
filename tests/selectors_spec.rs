use chrono::{DateTime, TimeZone, Utc};
use specboard::models::*;
use specboard::state::*;
use speculate2::speculate;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, 9, 0, 0).unwrap()
}

fn bolt(id: &str, intent: &str, status: ArtifactStatus) -> Bolt {
    Bolt {
        id: id.to_string(),
        intent: intent.to_string(),
        status,
        ..Default::default()
    }
}

fn story(id: &str, status: ArtifactStatus) -> Story {
    Story {
        id: id.to_string(),
        title: format!("Story {}", id),
        unit_name: "core".to_string(),
        intent_name: String::new(),
        path: String::new(),
        status,
        priority: StoryPriority::Should,
    }
}

fn intent(number: &str, name: &str, stories: Vec<Story>) -> Intent {
    let unit = Unit::build(CreateUnitInput {
        name: "core".to_string(),
        intent_name: format!("{}-{}", number, name),
        stories,
        ..Default::default()
    });
    Intent::build(CreateIntentInput {
        number: number.to_string(),
        name: name.to_string(),
        units: vec![unit],
        ..Default::default()
    })
}

fn resolved(bolts: Vec<Bolt>) -> Vec<Bolt> {
    specboard::engine::dependencies::compute_bolt_dependencies(&bolts)
}

speculate! {
    before {
        let intents = vec![
            intent("001", "auth", vec![story("001", ArtifactStatus::Draft)]),
            intent("002", "billing", vec![story("001", ArtifactStatus::Draft)]),
        ];
    }

    describe "select_current_intent_default" {
        use pretty_assertions::assert_eq;

        it "returns nothing when there are no bolts" {
            assert!(select_current_intent_default(&intents, &[]).is_none());
        }

        it "returns nothing when every bolt is complete" {
            let bolts = resolved(vec![
                bolt("a", "001", ArtifactStatus::Complete),
                bolt("b", "002", ArtifactStatus::Complete),
            ]);
            assert!(select_current_intent_default(&intents, &bolts).is_none());
        }

        it "prefers the intent of the most recently started active bolt" {
            let mut older = bolt("a", "001", ArtifactStatus::InProgress);
            older.started_at = Some(at(1));
            let mut newer = bolt("b", "billing", ArtifactStatus::InProgress);
            newer.started_at = Some(at(5));

            let bolts = resolved(vec![older, newer]);
            let current = select_current_intent_default(&intents, &bolts).unwrap();
            assert_eq!(current.number, "002");
            assert_eq!(intent_context(Some(current), &bolts), IntentContext::Active);
        }

        it "falls back to the first unblocked queued bolt" {
            let bolts = resolved(vec![
                bolt("a", "001-auth", ArtifactStatus::Complete),
                bolt("b", "002", ArtifactStatus::Draft),
            ]);
            let current = select_current_intent_default(&intents, &bolts).unwrap();
            assert_eq!(current.name, "billing");
            assert_eq!(intent_context(Some(current), &bolts), IntentContext::Queued);
        }

        it "skips queued bolts that are blocked" {
            let mut blocked = bolt("a", "001", ArtifactStatus::Draft);
            blocked.requires_bolts = vec!["missing".to_string()];
            let bolts = resolved(vec![blocked]);
            assert!(select_current_intent_default(&intents, &bolts).is_none());
        }
    }

    describe "select_current_intent_by_pending_bolts" {
        use pretty_assertions::assert_eq;

        it "picks the intent with the most open bolts" {
            let bolts = resolved(vec![
                bolt("a", "001", ArtifactStatus::Draft),
                bolt("b", "002", ArtifactStatus::Draft),
                bolt("c", "002", ArtifactStatus::InProgress),
                bolt("d", "001", ArtifactStatus::Complete),
            ]);
            let current = select_current_intent_by_pending_bolts(&intents, &bolts).unwrap();
            assert_eq!(current.number, "002");
        }

        it "breaks ties in favour of the earlier declared intent" {
            let declared = vec![
                intent("9", "alpha", vec![]),
                intent("10", "beta", vec![]),
            ];
            let bolts = resolved(vec![
                bolt("a", "9", ArtifactStatus::Draft),
                bolt("b", "10", ArtifactStatus::Draft),
            ]);

            let current = select_current_intent_by_pending_bolts(&declared, &bolts).unwrap();
            assert_eq!(current.key(), "9-alpha");
        }

        it "returns nothing without intents" {
            assert!(select_current_intent_by_pending_bolts(&[], &[]).is_none());
        }
    }

    describe "bolt categorization" {
        use pretty_assertions::assert_eq;

        it "orders active bolts by start time, newest first" {
            let mut a = bolt("a", "001", ArtifactStatus::InProgress);
            a.started_at = Some(at(2));
            let mut b = bolt("b", "001", ArtifactStatus::InProgress);
            b.started_at = Some(at(4));
            let c = bolt("c", "001", ArtifactStatus::Draft);

            let active = select_active_bolts_default(&[a, b, c]);
            let ids: Vec<&str> = active.iter().map(|b| b.id.as_str()).collect();
            assert_eq!(ids, vec!["b", "a"]);
        }

        it "partitions bolts into stats buckets" {
            let mut waiting = bolt("w", "001", ArtifactStatus::Draft);
            waiting.requires_bolts = vec!["a".to_string()];
            let bolts = resolved(vec![
                bolt("a", "001", ArtifactStatus::InProgress),
                bolt("q", "001", ArtifactStatus::Draft),
                bolt("u", "001", ArtifactStatus::Unknown),
                bolt("d", "001", ArtifactStatus::Complete),
                bolt("s", "001", ArtifactStatus::Blocked),
                waiting,
            ]);

            let stats = select_bolt_stats(&bolts);
            assert_eq!(
                stats,
                BoltStats {
                    active: 1,
                    queued: 2,
                    done: 1,
                    blocked: 2,
                }
            );
            assert_eq!(stats.total(), bolts.len());
        }

        it "lists completed bolts" {
            let bolts = vec![
                bolt("a", "001", ArtifactStatus::Complete),
                bolt("b", "001", ArtifactStatus::Draft),
            ];
            assert_eq!(select_completed_bolts(&bolts).len(), 1);
        }
    }

    describe "select_next_actions" {
        use pretty_assertions::assert_eq;

        it "suggests continuing the active bolt and finishing its stage" {
            let mut active = bolt("a", "001", ArtifactStatus::InProgress);
            active.current_stage = Some("implement".to_string());

            let actions = select_next_actions(&resolved(vec![active]), &intents);
            assert_eq!(actions[0].action_type, NextActionType::ContinueBolt);
            assert_eq!(actions[0].target_id.as_deref(), Some("a"));
            assert_eq!(actions[1].action_type, NextActionType::CompleteStage);
            assert_eq!(actions[1].title, "Complete implement Stage");
        }

        it "suggests starting the best queued bolt when nothing is active" {
            let mut x = bolt("x", "001", ArtifactStatus::Draft);
            x.requires_bolts = vec!["y".to_string()];
            let bolts = resolved(vec![x, bolt("y", "001", ArtifactStatus::Draft)]);

            let top = select_top_next_action(&bolts, &intents).unwrap();
            assert_eq!(top.action_type, NextActionType::StartBolt);
            assert_eq!(top.target_id.as_deref(), Some("y"));
            assert_eq!(top.description, "Start y - enables 1 other bolt(s)");
        }

        it "suggests unblocking a bolt that several others wait on" {
            let mut b = bolt("b", "001", ArtifactStatus::Draft);
            b.requires_bolts = vec!["a".to_string()];
            let mut c = bolt("c", "001", ArtifactStatus::Draft);
            c.requires_bolts = vec!["a".to_string()];
            let bolts = resolved(vec![bolt("a", "001", ArtifactStatus::InProgress), b, c]);

            let actions = select_next_actions(&bolts, &intents);
            let unblock = actions
                .iter()
                .find(|a| a.action_type == NextActionType::UnblockBolt)
                .expect("unblock action");
            assert_eq!(unblock.target_id.as_deref(), Some("a"));
            assert_eq!(unblock.metadata["unblocks_count"], 2);
        }

        it "suggests creating bolts for intents without open work" {
            let bolts = resolved(vec![bolt("a", "001", ArtifactStatus::InProgress)]);
            let actions = select_next_actions(&bolts, &intents);
            let create: Vec<&NextAction> = actions
                .iter()
                .filter(|a| a.action_type == NextActionType::CreateBolt)
                .collect();
            assert_eq!(create.len(), 1);
            assert_eq!(create[0].target_name.as_deref(), Some("billing"));
        }

        it "celebrates when everything is complete" {
            let done = vec![intent("001", "auth", vec![story("001", ArtifactStatus::Complete)])];
            let bolts = resolved(vec![bolt("a", "001", ArtifactStatus::Complete)]);
            let actions = select_next_actions(&bolts, &done);
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].action_type, NextActionType::Celebrate);
        }

        it "returns actions sorted by priority" {
            let mut active = bolt("a", "001", ArtifactStatus::InProgress);
            active.current_stage = Some("test".to_string());
            let actions = select_next_actions(&resolved(vec![active]), &intents);
            let priorities: Vec<u8> = actions.iter().map(|a| a.priority).collect();
            let mut sorted = priorities.clone();
            sorted.sort_unstable();
            assert_eq!(priorities, sorted);
        }
    }

    describe "select_progress_metrics" {
        use pretty_assertions::assert_eq;

        it "rounds story completion to a whole percent" {
            let stories = vec![
                story("001", ArtifactStatus::Complete),
                story("002", ArtifactStatus::Draft),
                story("003", ArtifactStatus::Draft),
            ];
            let metrics = select_progress_metrics(&intents, &[], &stories, &[]);
            assert_eq!(metrics.completed_stories, 1);
            assert_eq!(metrics.overall_percent, 33);
            assert_eq!(metrics.total_intents, 2);
        }

        it "reports zero percent without stories" {
            assert_eq!(select_progress_metrics(&[], &[], &[], &[]).overall_percent, 0);
        }
    }

    describe "select_filtered_intents" {
        use pretty_assertions::assert_eq;

        it "filters by intent status" {
            let mixed = vec![
                intent("001", "auth", vec![story("001", ArtifactStatus::Complete)]),
                intent("002", "billing", vec![story("001", ArtifactStatus::InProgress)]),
                intent("003", "search", vec![story("001", ArtifactStatus::Draft)]),
            ];

            let names = |filter| -> Vec<String> {
                select_filtered_intents(&mixed, filter)
                    .into_iter()
                    .map(|i| i.name)
                    .collect()
            };

            assert_eq!(names(IntentFilter::All).len(), 3);
            assert_eq!(names(IntentFilter::Complete), vec!["auth"]);
            assert_eq!(names(IntentFilter::Active), vec!["billing"]);
            assert_eq!(names(IntentFilter::Pending), vec!["search"]);
        }
    }

    describe "compute_state" {
        use pretty_assertions::assert_eq;

        it "resolves dependencies before selecting" {
            let mut b = bolt("b", "001", ArtifactStatus::Draft);
            b.requires_bolts = vec!["a".to_string()];
            let raw = vec![bolt("a", "001", ArtifactStatus::Draft), b];

            let computed = compute_state(&intents, &[], &[], &raw, &ComputeConfig::default());
            assert_eq!(computed.bolt_stats.blocked, 1);
            assert_eq!(computed.bolt_stats.queued, 1);
            assert_eq!(computed.pending_bolts[0].id, "a");
            assert_eq!(computed.pending_bolts[0].unblocks_count, 1);
            assert_eq!(computed.current_intent.as_ref().map(|i| i.number.as_str()), Some("001"));
            assert_eq!(computed.current_intent_context, IntentContext::Queued);
        }

        it "uses the configured intent strategy" {
            let raw = vec![
                bolt("a", "001", ArtifactStatus::Complete),
                bolt("b", "002", ArtifactStatus::Blocked),
            ];
            let config = ComputeConfig {
                intent_selector: select_current_intent_by_pending_bolts,
                ..ComputeConfig::default()
            };

            let computed = compute_state(&intents, &[], &[], &raw, &config);
            assert_eq!(computed.current_intent.map(|i| i.number), Some("002".to_string()));
        }

        it "is deterministic" {
            let raw = vec![
                bolt("a", "001", ArtifactStatus::InProgress),
                bolt("b", "002", ArtifactStatus::Draft),
            ];
            let config = ComputeConfig::default();
            assert_eq!(
                compute_state(&intents, &[], &[], &raw, &config),
                compute_state(&intents, &[], &[], &raw, &config)
            );
        }
    }
}
