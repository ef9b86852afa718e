// Catalog Model
// Dance styles offered by the generator, grouped by category

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DanceStyleCategory {
    pub category: &'static str,
    pub styles: &'static [&'static str],
}

pub const DANCE_STYLES: &[DanceStyleCategory] = &[
    DanceStyleCategory {
        category: "Indian Classical",
        styles: &[
            "Bharatanatyam",
            "Kathak",
            "Kuchipudi",
            "Odissi",
            "Manipuri",
            "Mohiniyattam",
            "Kathakali",
            "Sattriya",
        ],
    },
    DanceStyleCategory {
        category: "Western",
        styles: &[
            "Ballet",
            "Contemporary",
            "Jazz",
            "Tap Dancing",
            "Hip-Hop",
            "Breakdancing",
            "Popping",
            "Locking",
            "House Dance",
        ],
    },
    DanceStyleCategory {
        category: "Latin",
        styles: &[
            "Salsa",
            "Bachata",
            "Merengue",
            "Rumba",
            "Cha-cha-cha",
            "Samba",
            "Argentine Tango",
            "Paso Doble",
        ],
    },
    DanceStyleCategory {
        category: "Ballroom",
        styles: &[
            "Waltz",
            "Foxtrot",
            "Quickstep",
            "Viennese Waltz",
            "Tango",
            "Slow Foxtrot",
        ],
    },
    DanceStyleCategory {
        category: "Folk & Traditional",
        styles: &[
            "Bhangra",
            "Garba",
            "Kalbelia",
            "Flamenco",
            "Irish Step Dancing",
            "Morris Dancing",
            "Cossack Dance",
            "Belly Dance",
        ],
    },
    DanceStyleCategory {
        category: "Modern & Street",
        styles: &[
            "Krump",
            "Waacking",
            "Voguing",
            "Afrobeats",
            "K-Pop Choreography",
            "Commercial Dance",
            "Urban Dance",
        ],
    },
    DanceStyleCategory {
        category: "Cultural",
        styles: &[
            "Bollywood",
            "Chinese Classical",
            "Japanese Butoh",
            "African Traditional",
            "Middle Eastern",
            "Polynesian",
            "Native American",
        ],
    },
];

/// Every style in catalog order
pub fn all_dance_styles() -> impl Iterator<Item = &'static str> {
    DANCE_STYLES.iter().flat_map(|c| c.styles.iter().copied())
}

/// Exact, case-sensitive catalog membership
pub fn is_known_style(style: &str) -> bool {
    all_dance_styles().any(|s| s == style)
}
