// Style Templates
// Canned six-step choreographies keyed by exact style name

use crate::models::{VideoStep, STEPS_PER_RESULT};

struct StepTemplate {
    title: &'static str,
    duration: &'static str,
    description: &'static str,
}

const fn step(
    title: &'static str,
    duration: &'static str,
    description: &'static str,
) -> StepTemplate {
    StepTemplate {
        title,
        duration,
        description,
    }
}

const BHARATANATYAM: [StepTemplate; STEPS_PER_RESULT] = [
    step(
        "Warm-up and Basic Position",
        "0:45",
        "Start with gentle stretches and establish your base stance with proper Araimandi position",
    ),
    step(
        "Namaskaram Sequence",
        "1:20",
        "Learn the traditional greeting with precise hand movements and devotional expressions",
    ),
    step(
        "Basic Adavu Patterns",
        "1:30",
        "Master fundamental stepping patterns with synchronized arm movements",
    ),
    step(
        "Mudra Integration",
        "1:15",
        "Incorporate classical hand gestures to tell the story through movement",
    ),
    step(
        "Expression and Abhinaya",
        "1:45",
        "Add facial expressions and emotional depth to your performance",
    ),
    step("Complete Tillana", "2:30", "Put all elements together for the full rhythmic sequence"),
];

const HIP_HOP: [StepTemplate; STEPS_PER_RESULT] = [
    step(
        "Basic Groove Foundation",
        "0:50",
        "Establish your bounce and connect with the beat naturally",
    ),
    step(
        "Isolation Techniques",
        "1:10",
        "Master head, shoulder, and chest isolations for authentic style",
    ),
    step("Top Rock Basics", "1:25", "Learn standing dance moves and footwork patterns"),
    step("Breaking Fundamentals", "1:40", "Introduction to basic floor work and transitions"),
    step("Freestyle Flow", "1:30", "Develop personal style and improvisation skills"),
    step("Battle Ready Combo", "2:00", "Complete routine with attitude and performance energy"),
];

const BALLET: [StepTemplate; STEPS_PER_RESULT] = [
    step("Barre Warm-up", "1:00", "Essential stretching and alignment preparation at the barre"),
    step("Basic Positions", "1:15", "Master the five fundamental positions of feet and arms"),
    step("Port de Bras", "1:20", "Graceful arm movements and upper body coordination"),
    step("Adagio Combinations", "1:45", "Slow, controlled movements building strength and balance"),
    step("Allegro Preparations", "1:35", "Jump preparations and basic traveling movements"),
    step("Grand Finale", "2:15", "Complete enchainement with leaps, turns, and reverence"),
];

const SALSA: [StepTemplate; STEPS_PER_RESULT] = [
    step("Basic Salsa Step", "0:55", "Master the fundamental 1-2-3, 5-6-7 rhythm and timing"),
    step("Cross Body Lead", "1:25", "Learn the essential partner traveling movement"),
    step("Right and Left Turns", "1:30", "Smooth turning techniques for both partners"),
    step("Shines and Footwork", "1:20", "Solo sections with intricate foot patterns"),
    step("Advanced Combinations", "1:50", "Complex turn patterns and styling elements"),
    step("Performance Routine", "2:20", "Complete social dance sequence with flair and attitude"),
];

const FALLBACK: [StepTemplate; STEPS_PER_RESULT] = [
    step(
        "Foundation and Warm-up",
        "0:45",
        "Begin with proper posture, breathing, and gentle preparation movements",
    ),
    step(
        "Basic Movement Patterns",
        "1:15",
        "Learn the core steps and rhythm specific to your chosen style",
    ),
    step(
        "Coordination Building",
        "1:30",
        "Integrate upper and lower body movements with musicality",
    ),
    step(
        "Intermediate Techniques",
        "1:40",
        "Add complexity with turns, jumps, or style-specific elements",
    ),
    step("Expression and Flow", "1:25", "Develop personal interpretation and smooth transitions"),
    step(
        "Complete Routine",
        "2:30",
        "Put all elements together in a polished performance sequence",
    ),
];

/// Styles with a dedicated template. Everything else gets the generic one.
pub const TEMPLATED_STYLES: [&str; 4] = ["Bharatanatyam", "Hip-Hop", "Ballet", "Salsa"];

fn template_for(style: &str) -> &'static [StepTemplate; STEPS_PER_RESULT] {
    match style {
        "Bharatanatyam" => &BHARATANATYAM,
        "Hip-Hop" => &HIP_HOP,
        "Ballet" => &BALLET,
        "Salsa" => &SALSA,
        _ => &FALLBACK,
    }
}

pub fn has_dedicated_template(style: &str) -> bool {
    TEMPLATED_STYLES.contains(&style)
}

/// Steps for a style. Always exactly six.
pub fn video_steps_for(style: &str) -> Vec<VideoStep> {
    template_for(style)
        .iter()
        .map(|t| VideoStep {
            title: t.title.to_string(),
            duration: t.duration.to_string(),
            description: t.description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::all_dance_styles;

    #[test]
    fn test_salsa_template() {
        let steps = video_steps_for("Salsa");
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0].title, "Basic Salsa Step");
        assert_eq!(steps[5].duration, "2:20");
    }

    #[test]
    fn test_untemplated_style_falls_back() {
        let steps = video_steps_for("Tap Dancing");
        assert_eq!(steps[0].title, "Foundation and Warm-up");
        assert!(!has_dedicated_template("Tap Dancing"));
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert_eq!(video_steps_for("salsa")[0].title, "Foundation and Warm-up");
        assert_eq!(video_steps_for("Hip-Hop ")[0].title, "Foundation and Warm-up");
    }

    #[test]
    fn test_every_catalog_style_gets_six_steps() {
        for style in all_dance_styles() {
            let steps = video_steps_for(style);
            assert_eq!(steps.len(), STEPS_PER_RESULT, "style {style}");
            let expected_fallback = !has_dedicated_template(style);
            assert_eq!(steps[0].title == "Foundation and Warm-up", expected_fallback);
        }
    }

    #[test]
    fn test_dedicated_templates_are_distinct() {
        let firsts: Vec<String> = TEMPLATED_STYLES
            .iter()
            .map(|s| video_steps_for(s)[0].title.clone())
            .collect();
        assert_eq!(
            firsts,
            [
                "Warm-up and Basic Position",
                "Basic Groove Foundation",
                "Barre Warm-up",
                "Basic Salsa Step"
            ]
        );
    }
}
