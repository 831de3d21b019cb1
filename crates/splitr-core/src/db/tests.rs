//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration};

    fn setup() -> (Database, User, User) {
        let db = Database::in_memory().unwrap();
        let alice = db.get_or_create_user("alice@example.com").unwrap();
        let bob = db.get_or_create_user("bob@example.com").unwrap();
        (db, alice, bob)
    }

    fn shared_expense(
        description: &str,
        amount: f64,
        category: &str,
        paid_by: i64,
        other: i64,
        date: DateTime<Utc>,
    ) -> NewExpense {
        NewExpense::equal_split(
            description,
            amount,
            Some(category.to_string()),
            date,
            paid_by,
            &[paid_by, other],
        )
        .unwrap()
    }

    fn template(alice: i64, bob: i64, frequency: Frequency) -> NewRecurringExpense {
        NewRecurringExpense {
            description: "Internet".to_string(),
            amount: 60.0,
            category: "utilities".to_string(),
            frequency,
            participants: vec![alice, bob],
            group_id: None,
            split_type: SplitType::Equal,
            splits: vec![
                TemplateSplit { user_id: alice, amount: 30.0, percentage: Some(50.0) },
                TemplateSplit { user_id: bob, amount: 30.0, percentage: Some(50.0) },
            ],
        }
    }

    #[test]
    fn test_schema_created() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'expense_groups', 'group_members', 'expenses', 'expense_splits', 'budgets', 'recurring_expenses', 'expense_suggestions', 'analytics_cache', 'audit_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 10);
    }

    #[test]
    fn test_get_or_create_user_is_idempotent() {
        let db = Database::in_memory().unwrap();

        let first = db.get_or_create_user("Carol@Example.com").unwrap();
        let second = db.get_or_create_user("carol@example.com ").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "carol@example.com");
        assert_eq!(first.name, "carol");

        assert!(db.get_or_create_user("   ").is_err());
        assert!(db.get_user(9999).unwrap().is_none());
    }

    #[test]
    fn test_create_and_get_expense() {
        let (db, alice, bob) = setup();

        let created = db
            .create_expense(
                &shared_expense("Dinner", 80.0, "foodDrink", alice.id, bob.id, Utc::now()),
                alice.id,
            )
            .unwrap();

        let fetched = db.get_expense(created.id).unwrap().unwrap();
        assert_eq!(fetched.description, "Dinner");
        assert_eq!(fetched.splits.len(), 2);
        assert_eq!(fetched.splits[0].user_id, alice.id);
        assert!(fetched.splits[0].paid);
        assert!(!fetched.splits[1].paid);
        assert_eq!(fetched.created_by, alice.id);
        assert_eq!(fetched.split_type, SplitType::Equal);
    }

    #[test]
    fn test_create_expense_rejects_invalid() {
        let (db, alice, bob) = setup();

        let mut bad = shared_expense("Dinner", 80.0, "food", alice.id, bob.id, Utc::now());
        bad.splits[0].amount = 10.0;
        assert!(matches!(
            db.create_expense(&bad, alice.id),
            Err(Error::InvalidData(_))
        ));

        let unknown = shared_expense("Dinner", 80.0, "food", alice.id, 4242, Utc::now());
        assert!(matches!(
            db.create_expense(&unknown, alice.id),
            Err(Error::InvalidData(_))
        ));

        // Nothing was written
        let listed = db
            .list_expenses_for_user(alice.id, &ExpenseFilter::default())
            .unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_list_expenses_involving_user() {
        let (db, alice, bob) = setup();
        let carol = db.get_or_create_user("carol@example.com").unwrap();
        let now = Utc::now();

        db.create_expense(
            &shared_expense("Lunch", 20.0, "food", alice.id, bob.id, now - Duration::days(2)),
            alice.id,
        )
        .unwrap();
        db.create_expense(
            &shared_expense("Taxi", 30.0, "transport", bob.id, carol.id, now - Duration::days(1)),
            bob.id,
        )
        .unwrap();

        let alice_expenses = db
            .list_expenses_for_user(alice.id, &ExpenseFilter::default())
            .unwrap();
        assert_eq!(alice_expenses.len(), 1);

        let bob_expenses = db
            .list_expenses_for_user(bob.id, &ExpenseFilter::default())
            .unwrap();
        assert_eq!(bob_expenses.len(), 2);
        // Newest first
        assert_eq!(bob_expenses[0].description, "Taxi");

        let recent = db
            .expenses_involving_user(bob.id, now - Duration::hours(36), None)
            .unwrap();
        assert_eq!(recent.len(), 1);

        let paid = db
            .list_expenses_for_user(
                bob.id,
                &ExpenseFilter {
                    paid_by_only: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].paid_by, bob.id);
    }

    #[test]
    fn test_groups() {
        let (db, alice, bob) = setup();

        let group = db
            .create_group("Flat", Some("Shared flat"), alice.id, &[alice.id, bob.id])
            .unwrap();
        assert_eq!(group.members.len(), 2);
        let admin = group.members.iter().find(|m| m.user_id == alice.id).unwrap();
        assert_eq!(admin.role, GroupRole::Admin);

        assert_eq!(db.list_groups_for_user(bob.id).unwrap().len(), 1);
        assert!(db.is_group_member(group.id, bob.id).unwrap());
        assert!(db.get_group(group.id + 100).unwrap().is_none());
        assert!(db.create_group(" ", None, alice.id, &[]).is_err());

        let mut expense = shared_expense("Rent", 900.0, "housing", alice.id, bob.id, Utc::now());
        expense.group_id = Some(group.id + 100);
        assert!(matches!(
            db.create_expense(&expense, alice.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_set_budget_upserts_and_keeps_spent() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        let budget = db.set_budget(alice.id, "food", 200.0, now).unwrap();
        assert_eq!(budget.spent, 0.0);
        assert_eq!(budget.month, now.month());

        db.create_expense(
            &shared_expense("Groceries", 50.0, "food", alice.id, bob.id, now),
            alice.id,
        )
        .unwrap();

        let updated = db.set_budget(alice.id, "food", 300.0, now).unwrap();
        assert_eq!(updated.id, budget.id);
        assert_eq!(updated.monthly_limit, 300.0);
        assert!((updated.spent - 25.0).abs() < 1e-9);

        assert!(db.set_budget(alice.id, "food", -1.0, now).is_err());
        assert!(db.set_budget(alice.id, "", 10.0, now).is_err());
    }

    #[test]
    fn test_expense_updates_each_participant_budget() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        db.set_budget(alice.id, "food", 100.0, now).unwrap();
        db.set_budget(bob.id, "food", 100.0, now).unwrap();

        db.create_expense(
            &shared_expense("Pizza", 40.0, "food", alice.id, bob.id, now),
            alice.id,
        )
        .unwrap();

        let alice_budgets = db.list_budgets(alice.id, now.year(), now.month()).unwrap();
        let bob_budgets = db.list_budgets(bob.id, now.year(), now.month()).unwrap();
        assert!((alice_budgets[0].spent - 20.0).abs() < 1e-9);
        assert!((bob_budgets[0].spent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_budget_spend_without_budget_is_noop() {
        let (db, alice, _) = setup();
        assert!(!db
            .record_budget_spend(alice.id, "travel", 10.0, Utc::now())
            .unwrap());

        db.set_budget(alice.id, "travel", 100.0, Utc::now()).unwrap();
        assert!(db
            .record_budget_spend(alice.id, "travel", 10.0, Utc::now())
            .unwrap());
    }

    #[test]
    fn test_budget_overview() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        db.set_budget(alice.id, "food", 100.0, now).unwrap();
        db.create_expense(
            &shared_expense("Restaurant", 160.0, "food", alice.id, bob.id, now),
            alice.id,
        )
        .unwrap();
        db.create_expense(
            &shared_expense("Museum", 20.0, "fun", bob.id, alice.id, now),
            bob.id,
        )
        .unwrap();

        let spending = db.monthly_spending_by_category(alice.id, now).unwrap();
        assert!((spending["food"] - 80.0).abs() < 1e-9);
        assert!((spending["fun"] - 10.0).abs() < 1e-9);

        let overview = db.budget_overview(alice.id, now).unwrap();
        assert_eq!(overview["food"].status, BudgetStatus::Warning);
        assert!((overview["food"].remaining - 20.0).abs() < 1e-9);
        assert_eq!(overview["fun"].status, BudgetStatus::NoBudget);
    }

    #[test]
    fn test_budget_overview_skips_zero_share() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        let gift = NewExpense {
            description: "Birthday gift".to_string(),
            amount: 50.0,
            category: Some("gifts".to_string()),
            date: now,
            paid_by: bob.id,
            split_type: SplitType::Exact,
            splits: vec![
                Split { user_id: alice.id, amount: 0.0, paid: false },
                Split { user_id: bob.id, amount: 50.0, paid: true },
            ],
            group_id: None,
            recurring_id: None,
        };
        db.create_expense(&gift, bob.id).unwrap();

        assert!(db.budget_overview(alice.id, now).unwrap().is_empty());
        let bob_overview = db.budget_overview(bob.id, now).unwrap();
        assert_eq!(bob_overview["gifts"].status, BudgetStatus::NoBudget);
    }

    #[test]
    fn test_recurring_create_and_list() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        let monthly = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Monthly), now)
            .unwrap();
        let weekly = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Weekly), now)
            .unwrap();

        assert_eq!(weekly.next_due, from_millis(to_millis(now + Duration::days(7))));
        assert!(weekly.is_active);
        assert!(weekly.last_created.is_none());

        let listed = db.list_recurring(alice.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, weekly.id);
        assert_eq!(listed[1].id, monthly.id);
        assert_eq!(listed[0].splits.len(), 2);

        assert!(db.list_recurring(bob.id).unwrap().is_empty());
    }

    #[test]
    fn test_recurring_rejects_negative_share() {
        let (db, alice, bob) = setup();
        let mut tmpl = template(alice.id, bob.id, Frequency::Monthly);
        tmpl.amount = 50.0;
        tmpl.split_type = SplitType::Exact;
        tmpl.splits = vec![
            TemplateSplit { user_id: alice.id, amount: 60.0, percentage: None },
            TemplateSplit { user_id: bob.id, amount: -10.0, percentage: None },
        ];

        assert!(matches!(
            db.create_recurring(alice.id, &tmpl, Utc::now()),
            Err(Error::InvalidData(_))
        ));

        tmpl.splits[1].amount = f64::NAN;
        assert!(matches!(
            db.create_recurring(alice.id, &tmpl, Utc::now()),
            Err(Error::InvalidData(_))
        ));
        assert!(db.list_recurring(alice.id).unwrap().is_empty());
    }

    #[test]
    fn test_recurring_materialize() {
        let (db, alice, bob) = setup();
        let created_at = Utc::now() - Duration::days(10);

        let tmpl = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Weekly), created_at)
            .unwrap();

        // Run a few days late; the schedule restarts from the run time
        let now = Utc::now();
        let outcome = db.materialize_recurring(tmpl.id, alice.id, now).unwrap();

        assert_eq!(outcome.expense.recurring_id, Some(tmpl.id));
        assert_eq!(outcome.expense.paid_by, alice.id);
        assert_eq!(outcome.expense.category.as_deref(), Some("utilities"));
        let alice_split = outcome
            .expense
            .splits
            .iter()
            .find(|s| s.user_id == alice.id)
            .unwrap();
        let bob_split = outcome
            .expense
            .splits
            .iter()
            .find(|s| s.user_id == bob.id)
            .unwrap();
        assert!(alice_split.paid);
        assert!(!bob_split.paid);

        let stored = db.get_recurring(tmpl.id).unwrap().unwrap();
        assert_eq!(stored.next_due, from_millis(to_millis(now + Duration::days(7))));
        assert_eq!(stored.last_created, Some(from_millis(to_millis(now))));
        assert!(stored.next_due > now);
    }

    #[test]
    fn test_recurring_materialize_errors() {
        let (db, alice, bob) = setup();
        let now = Utc::now();
        let tmpl = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Weekly), now)
            .unwrap();

        assert!(matches!(
            db.materialize_recurring(tmpl.id, bob.id, now),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            db.materialize_recurring(tmpl.id + 1000, alice.id, now),
            Err(Error::NotFound(_))
        ));

        let toggled = db.set_recurring_active(tmpl.id, alice.id, false).unwrap();
        assert!(!toggled.is_active);
        assert_eq!(toggled.next_due, tmpl.next_due);
        assert!(matches!(
            db.materialize_recurring(tmpl.id, alice.id, now),
            Err(Error::Inactive(_))
        ));

        // No expense was written by the failed attempts
        let expenses = db
            .list_expenses_for_user(alice.id, &ExpenseFilter::default())
            .unwrap();
        assert!(expenses.is_empty());
    }

    #[test]
    fn test_recurring_due_and_delete() {
        let (db, alice, bob) = setup();
        let past = Utc::now() - Duration::days(30);

        let due = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Weekly), past)
            .unwrap();
        let paused = db
            .create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Biweekly), past)
            .unwrap();
        db.set_recurring_active(paused.id, alice.id, false).unwrap();
        db.create_recurring(alice.id, &template(alice.id, bob.id, Frequency::Yearly), past)
            .unwrap();

        let now = Utc::now();
        let listed = db.list_due_recurring(now).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, due.id);

        let outcomes = db.materialize_due_recurring(now).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(db.list_due_recurring(now).unwrap().is_empty());

        assert!(matches!(
            db.delete_recurring(due.id, bob.id),
            Err(Error::Unauthorized(_))
        ));
        db.delete_recurring(due.id, alice.id).unwrap();
        assert!(db.get_recurring(due.id).unwrap().is_none());

        // The materialized expense survives its template
        let expenses = db
            .list_expenses_for_user(alice.id, &ExpenseFilter::default())
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].recurring_id, None);
    }

    fn seed_coffee(db: &Database, alice: i64, bob: i64) {
        let now = Utc::now();
        for i in 0..3 {
            db.create_expense(
                &shared_expense("Coffee", 5.0, "foodDrink", alice, bob, now - Duration::days(7 * i + 1)),
                alice,
            )
            .unwrap();
        }
        // A one-off and an expense outside the window are ignored
        db.create_expense(
            &shared_expense("Concert", 90.0, "fun", alice, bob, now - Duration::days(3)),
            alice,
        )
        .unwrap();
        db.create_expense(
            &shared_expense("Concert", 90.0, "fun", alice, bob, now - Duration::days(120)),
            alice,
        )
        .unwrap();
    }

    #[test]
    fn test_generate_suggestions() {
        let (db, alice, bob) = setup();
        seed_coffee(&db, alice.id, bob.id);

        let stored = db.generate_suggestions(alice.id, Utc::now()).unwrap();
        assert_eq!(stored, 1);

        let suggestions = db.list_suggestions(alice.id).unwrap();
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.description, "Coffee");
        assert_eq!(s.frequency, SuggestionFrequency::Weekly);
        assert!((s.confidence - 1.0).abs() < 1e-9);
        assert!((s.avg_amount - 5.0).abs() < 1e-9);
        assert_eq!(s.based_on_expenses.len(), 3);

        // Bob paid for none of them
        assert_eq!(db.generate_suggestions(bob.id, Utc::now()).unwrap(), 0);
    }

    #[test]
    fn test_regeneration_replaces_dismissed() {
        let (db, alice, bob) = setup();
        seed_coffee(&db, alice.id, bob.id);

        db.generate_suggestions(alice.id, Utc::now()).unwrap();
        let id = db.list_suggestions(alice.id).unwrap()[0].id;

        assert!(matches!(
            db.dismiss_suggestion(id, bob.id),
            Err(Error::Unauthorized(_))
        ));
        db.dismiss_suggestion(id, alice.id).unwrap();
        assert!(db.list_suggestions(alice.id).unwrap().is_empty());

        db.generate_suggestions(alice.id, Utc::now()).unwrap();
        let regenerated = db.list_suggestions(alice.id).unwrap();
        assert_eq!(regenerated.len(), 1);
        assert_ne!(regenerated[0].id, id);
    }

    #[test]
    fn test_list_suggestions_limited() {
        let (db, alice, bob) = setup();
        let now = Utc::now();
        for n in 0..7 {
            for i in 0..2 {
                db.create_expense(
                    &shared_expense(
                        &format!("Item {}", n),
                        10.0 + (n * i) as f64,
                        "misc",
                        alice.id,
                        bob.id,
                        now - Duration::days(i as i64 * 5 + 1),
                    ),
                    alice.id,
                )
                .unwrap();
            }
        }

        assert_eq!(db.generate_suggestions(alice.id, now).unwrap(), 7);
        let listed = db.list_suggestions(alice.id).unwrap();
        assert_eq!(listed.len(), 5);
        assert!(listed.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_use_suggestion() {
        let (db, alice, bob) = setup();
        seed_coffee(&db, alice.id, bob.id);
        db.generate_suggestions(alice.id, Utc::now()).unwrap();
        let suggestion = db.list_suggestions(alice.id).unwrap().remove(0);

        assert!(matches!(
            db.use_suggestion(suggestion.id, bob.id, None, &[bob.id], None, Utc::now()),
            Err(Error::Unauthorized(_))
        ));

        let expense = db
            .use_suggestion(
                suggestion.id,
                alice.id,
                None,
                &[alice.id, bob.id],
                None,
                Utc::now(),
            )
            .unwrap();
        assert!((expense.amount - 5.0).abs() < 1e-9);
        assert_eq!(expense.split_type, SplitType::Equal);
        assert!((expense.splits[1].amount - 2.5).abs() < 1e-9);
        assert!(expense.splits[0].paid);

        assert!(db.list_suggestions(alice.id).unwrap().is_empty());
    }

    #[test]
    fn test_analytics_cache() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        db.create_expense(
            &shared_expense("Dinner", 60.0, "food", alice.id, bob.id, now - Duration::hours(1)),
            alice.id,
        )
        .unwrap();

        let first = db.expense_analytics(alice.id, TimeRange::Week, now).unwrap();
        assert!((first.total_spent - 30.0).abs() < 1e-9);

        db.create_expense(
            &shared_expense("Taxi", 40.0, "transport", bob.id, alice.id, now - Duration::minutes(30)),
            bob.id,
        )
        .unwrap();

        // Within the TTL the cached result is served
        let cached = db
            .expense_analytics(alice.id, TimeRange::Week, now + Duration::minutes(5))
            .unwrap();
        assert_eq!(cached, first);

        // After the TTL it is recomputed
        let fresh = db
            .expense_analytics(alice.id, TimeRange::Week, now + Duration::minutes(16))
            .unwrap();
        assert!((fresh.total_spent - 50.0).abs() < 1e-9);
        assert_eq!(fresh.category_breakdown.len(), 2);

        assert_eq!(db.clear_analytics_cache(alice.id).unwrap(), 1);
        assert_eq!(db.clear_analytics_cache(alice.id).unwrap(), 0);
    }

    #[test]
    fn test_analytics_cache_ttl_from_config() {
        let db = Database::in_memory().unwrap().with_config(crate::SplitrConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        });
        let alice = db.get_or_create_user("alice@example.com").unwrap();
        let now = Utc::now();

        db.expense_analytics(alice.id, TimeRange::Month, now).unwrap();
        db.create_expense(
            &NewExpense::equal_split("Book", 12.0, None, now, alice.id, &[alice.id]).unwrap(),
            alice.id,
        )
        .unwrap();

        let result = db.expense_analytics(alice.id, TimeRange::Month, now).unwrap();
        assert!((result.total_spent - 12.0).abs() < 1e-9);
        assert_eq!(result.top_category.unwrap().name, "other");
    }

    #[test]
    fn test_oversized_config_values_are_clamped() {
        let db = Database::in_memory().unwrap().with_config(crate::SplitrConfig {
            cache_ttl_secs: u64::MAX,
            suggestion_window_days: i64::MAX,
            ..Default::default()
        });
        let alice = db.get_or_create_user("alice@example.com").unwrap();
        let now = Utc::now();

        db.expense_analytics(alice.id, TimeRange::Week, now).unwrap();
        // Still inside the (clamped) TTL, so the cached entry is served
        let cached = db.expense_analytics(alice.id, TimeRange::Week, now).unwrap();
        assert_eq!(cached.total_spent, 0.0);

        assert_eq!(db.generate_suggestions(alice.id, now).unwrap(), 0);
    }

    #[test]
    fn test_spending_trends() {
        let (db, alice, bob) = setup();
        let now = Utc::now();

        db.create_expense(
            &shared_expense("Lunch", 20.0, "food", alice.id, bob.id, now),
            alice.id,
        )
        .unwrap();

        let series = db
            .spending_trends(alice.id, TimeRange::Week, TrendGrouping::Day, now)
            .unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series[6].expense_count, 1);
        assert!((series[6].total_spent - 10.0).abs() < 1e-9);

        let empty = db
            .spending_trends(alice.id, TimeRange::Year, TrendGrouping::Day, now)
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_receipts() {
        let (db, alice, bob) = setup();
        let expense = db
            .create_expense(
                &shared_expense("Dinner", 16.5, "foodDrink", alice.id, bob.id, Utc::now()),
                alice.id,
            )
            .unwrap();

        let data = ReceiptData {
            extracted_text: Some("RESTAURANT ABC".into()),
            confidence: Some(0.85),
            merchant_name: Some("Restaurant ABC".into()),
            extracted_amount: Some(16.5),
        };

        assert!(matches!(
            db.attach_receipt(expense.id, bob.id, "https://example.com/receipts/a.jpg", &data),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            db.attach_receipt(expense.id + 99, alice.id, "https://example.com/receipts/a.jpg", &data),
            Err(Error::NotFound(_))
        ));

        let updated = db
            .attach_receipt(expense.id, alice.id, "https://example.com/receipts/a.jpg", &data)
            .unwrap();
        assert_eq!(updated.receipt_data, Some(data));

        assert_eq!(db.list_expenses_with_receipts(alice.id).unwrap().len(), 1);
        assert!(db.list_expenses_with_receipts(bob.id).unwrap().is_empty());

        let analysis = db.receipt_analysis(alice.id).unwrap();
        assert_eq!(analysis.total_receipts_scanned, 1);
        assert!((analysis.average_confidence - 0.85).abs() < 1e-9);
        assert_eq!(analysis.top_merchants.get("Restaurant ABC"), Some(&1));
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();

        db.log_audit("alice@example.com", "create", Some("expense"), Some(1), None)
            .unwrap();
        db.log_audit("alice@example.com", "delete", Some("recurring"), Some(2), Some("{}"))
            .unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "delete");
        assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
    }
}
