use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizplay_core::model::{AnswerSet, Question};
use quizplay_core::score::ScoreCard;
use quizplay_core::session::QuizSession;
use quizplay_core::traits::NullResultStore;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            if i % 3 == 0 {
                Question::boolean(&format!("Statement {i} is true."), i % 2 == 0)
            } else {
                Question::multiple_choice(
                    &format!("Question {i}?"),
                    &format!("Answer {i}"),
                    &["Wrong A", "Wrong B", "Wrong C"],
                )
            }
        })
        .collect()
}

fn make_answers(questions: &[Question]) -> AnswerSet {
    let mut answers = AnswerSet::new();
    for (i, q) in questions.iter().enumerate() {
        if i % 4 != 0 {
            answers.record(i, &format!("  {}  ", q.correct_answer.to_uppercase()));
        }
    }
    answers
}

fn bench_score_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_compute");

    for n in [5, 50, 500] {
        let questions = make_questions(n);
        let answers = make_answers(&questions);
        group.bench_function(format!("questions={n}"), |b| {
            b.iter(|| ScoreCard::compute(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_full_session(c: &mut Criterion) {
    let questions = make_questions(50);

    c.bench_function("session_answer_all_and_submit", |b| {
        b.iter(|| {
            let mut session =
                QuizSession::new(questions.clone(), Arc::new(NullResultStore)).unwrap();
            for q in &questions {
                session.answer_current(&q.correct_answer);
                session.next();
            }
            black_box(session.submit(false))
        })
    });
}

fn bench_options(c: &mut Criterion) {
    let question = Question::multiple_choice(
        "Which is largest?",
        "Jupiter",
        &["Mars", "jupiter ", "Venus", "Earth", "Saturn"],
    );

    c.bench_function("question_options", |b| {
        b.iter(|| black_box(&question).options())
    });
}

criterion_group!(
    benches,
    bench_score_compute,
    bench_full_session,
    bench_options
);
criterion_main!(benches);
