use engine::Engine;
use primitives::{Color, Image};
use shapes::ShapeKind;

fn gradient_target(p_size: u32) -> Image {
  let mut img = Image::new(p_size, p_size);
  for y in 0..p_size as i32 {
    for x in 0..p_size as i32 {
      img.set_pixel(x, y, Color::from_rgb((x * 13 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8));
    }
  }
  img
}

#[test]
fn identical_seeds_produce_identical_transcripts() {
  let mut first = Engine::new(gradient_target(24), Color::from_rgb(90, 90, 90), 96, 1, 1234).unwrap();
  let mut second = Engine::new(gradient_target(24), Color::from_rgb(90, 90, 90), 96, 1, 1234).unwrap();
  for _ in 0..3 {
    first.step(ShapeKind::Triangle, 128, 0);
    second.step(ShapeKind::Triangle, 128, 0);
  }
  assert_eq!(first.placements().len(), second.placements().len());
  for (a, b) in first.placements().iter().zip(second.placements().iter()) {
    assert_eq!(a.shape, b.shape);
    assert_eq!(a.color, b.color);
    assert_eq!(a.score, b.score);
  }
  assert_eq!(first.current().rgba(), second.current().rgba());
}

#[test]
fn committed_scores_never_increase() {
  let mut engine = Engine::new(gradient_target(24), Color::from_rgb(128, 128, 128), 96, 2, 7).unwrap();
  let mut previous = engine.score();
  for _ in 0..4 {
    engine.step(ShapeKind::Any, 128, 0);
    let score = engine.score();
    assert!(score <= previous + 1e-12, "score went up: {previous} -> {score}");
    previous = score;
  }
}

#[test]
fn transcript_replay_reproduces_the_composite() {
  let mut engine = Engine::new(gradient_target(20), Color::from_rgb(40, 80, 120), 80, 2, 42).unwrap();
  for _ in 0..3 {
    engine.step(ShapeKind::Rectangle, 150, 0);
  }
  let replayed = engine.replay();
  assert_eq!(replayed.rgba(), engine.current().rgba());
}

#[test]
fn transcript_scores_match_running_score() {
  let mut engine = Engine::new(gradient_target(16), Color::from_rgb(100, 100, 100), 64, 1, 5).unwrap();
  engine.step(ShapeKind::Ellipse, 128, 0);
  engine.step(ShapeKind::Ellipse, 128, 1);
  let last = engine.placements().last().unwrap();
  assert_eq!(last.score, engine.score());
}

#[test]
fn uniform_target_with_mean_background_converges_in_one_step() {
  // Background equals the target exactly, so score starts at zero and a
  // committed triangle must reproduce the target color.
  let target = Image::uniform(32, 32, Color::from_rgb(255, 0, 0));
  let background = target.average_color();
  assert_eq!(background, Color::from_rgb(255, 0, 0));
  let mut engine = Engine::new(target, background, 64, 1, 3).unwrap();
  engine.step(ShapeKind::Triangle, 128, 0);
  let placement = &engine.placements()[0];
  assert_eq!(placement.color.a, 128);
  assert!((placement.color.r as i32 - 255).abs() <= 1);
  assert!(placement.color.g <= 1);
  assert!(placement.color.b <= 1);
  assert!(engine.score() < 1e-6, "score {}", engine.score());
}

#[test]
fn svg_document_lists_every_placement() {
  let mut engine = Engine::new(gradient_target(16), Color::from_rgb(10, 20, 30), 64, 1, 11).unwrap();
  engine.step(ShapeKind::Rectangle, 128, 0);
  engine.step(ShapeKind::Circle, 128, 0);
  let svg = engine.svg();
  assert!(svg.starts_with("<svg "));
  assert!(svg.contains("width=\"64\" height=\"64\""));
  assert!(svg.contains("fill=\"#0a141e\""));
  assert!(svg.contains("<rect "));
  assert!(svg.contains("<ellipse "));
  assert!(svg.contains("scale(4) translate(0.5 0.5)"));
  assert!(svg.ends_with("</svg>"));
}

#[test]
fn frames_replay_starts_with_the_background() {
  let mut engine = Engine::new(gradient_target(16), Color::from_rgb(200, 200, 200), 32, 1, 19).unwrap();
  engine.step(ShapeKind::Rectangle, 128, 0);
  let frames = engine.frames(0.0);
  assert_eq!(frames.len(), 2);
  let (w, h) = engine.scaled_dimensions();
  assert_eq!(frames[0].dimensions(), (w, h));
  for px in frames[0].rgba().chunks_exact(4) {
    assert_eq!(&px[..3], &[200, 200, 200]);
  }
}

#[test]
fn invalid_construction_is_rejected() {
  assert!(Engine::new(Image::new(0, 4), Color::black(), 64, 1, 0).is_err());
  assert!(Engine::new(Image::new(4, 4), Color::black(), 64, 0, 0).is_err());
  assert!(Engine::new(Image::new(4, 4), Color::black(), 0, 1, 0).is_err());
}

#[test]
fn clear_resets_composite_and_transcript() {
  let mut engine = Engine::new(gradient_target(16), Color::from_rgb(50, 60, 70), 64, 1, 23).unwrap();
  let initial = engine.score();
  engine.step(ShapeKind::Triangle, 128, 0);
  assert!(!engine.placements().is_empty());
  engine.clear();
  assert!(engine.placements().is_empty());
  assert_eq!(engine.score(), initial);
  for px in engine.current().rgba().chunks_exact(4) {
    assert_eq!(&px[..3], &[50, 60, 70]);
  }
}
