//! The static card catalog.

use super::{CardDef, CardId, ExecutionKind};

/// Every card definition, sentinel included.
pub(crate) fn all_cards() -> Vec<CardDef> {
    vec![
        CardDef::new(
            CardId::CREATE_FEATURES,
            "Create Features",
            "Create a new 2x2 feature on the board. You cannot convert your opponent's features.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0, 1, 10, 11]),
        CardDef::new(
            CardId::ERASE_FEATURES,
            "Erase Features",
            "Erase features in a 2x3 mask. This can remove both your and your opponent's features.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0, 1, 10, 11, 20, 21])
        .with_reach(2),
        CardDef::new(
            CardId::CLIP,
            "Clip",
            "Convert an opponent's 2x2 feature to your own.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0, 1, 10, 11]),
        CardDef::new(
            CardId::FIELD_COLLECTION,
            "Field Collection",
            "Add four features anywhere on the board.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0])
        .with_plays(4),
        CardDef::new(
            CardId::INTERPOLATE,
            "Interpolate",
            "Squares with at least three of your features neighboring are filled with your pieces. \
             This can convert opponent's features.",
            ExecutionKind::Immediate,
        ),
        CardDef::new(
            CardId::DISSOLVE,
            "Dissolve",
            "Convert a polygon of your opponent's features touching a polygon feature of your own \
             to your features.",
            ExecutionKind::Placement,
        ),
        CardDef::new(
            CardId::GROUND_TRUTH,
            "Ground Truth",
            "Make up to 6 one-space moves of any pieces. Pieces can be moved off the side of the \
             map to be removed.",
            ExecutionKind::GroundTruth,
        )
        .with_plays(6),
        CardDef::new(
            CardId::BUFFER,
            "Buffer",
            "Choose one of your polygon features. All empty squares orthogonally adjacent to that \
             polygon are filled with your features.",
            ExecutionKind::Placement,
        ),
        CardDef::new(
            CardId::DISCARD_EDITS,
            "Discard Edits",
            "Return the board to its state previous to your opponent's last turn.",
            ExecutionKind::Immediate,
        ),
        CardDef::new(
            CardId::FILL_SINKS,
            "Fill Sinks",
            "Any square with four pieces around it is filled with your pieces. This cannot convert \
             your opponent's features. The edge of the map counts as a surrounding piece.",
            ExecutionKind::Immediate,
        ),
        CardDef::new(
            CardId::PROJECT,
            "Project",
            "Choose a direction to reproject the map into. All pieces move one square in that \
             direction. Pieces that move off the side of the map are removed.",
            ExecutionKind::ChooseDirection,
        ),
        CardDef::new(
            CardId::SPATIAL_JOIN,
            "Spatial Join",
            "Add a piece to all of your line and polygon features.",
            ExecutionKind::SpatialJoin,
        ),
        CardDef::new(
            CardId::TURN_OFF_LAYER,
            "Turn Off Layer",
            "Remove all features of a selected type: line, polygon, or point. This affects both \
             your and your opponent's features.",
            ExecutionKind::ChooseLayer,
        ),
        CardDef::new(
            CardId::CRUNCH_TIME,
            "Crunch Time",
            "Discard this card and skip a turn. At the end of the game, choose a tool from the \
             top 3 of the remaining deck and play immediately.",
            ExecutionKind::Crunch,
        ),
        CardDef::new(
            CardId::HOTSPOT_ANALYSIS,
            "Hotspot Analysis",
            "Add one piece to the board. Move four of your pieces any number of squares to create \
             a continuous polygon feature with this new piece.",
            ExecutionKind::Hotspot,
        )
        .with_plays(4),
        CardDef::new(
            CardId::NEAREST_NEIGHBOR,
            "Nearest Neighbor",
            "Choose an orthogonal direction. All empty spaces adjacent to one of your features in \
             that direction are filled with your features.",
            ExecutionKind::ChooseDirection,
        ),
        CardDef::new(
            CardId::TESSELATE,
            "Tesselate",
            "Create a 3x3 alternating grid of your features centered on the selected square. This \
             cannot convert your opponent's features.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0, 2, 11, 13, 20, 22, 31, 33])
        .with_reach(3),
        CardDef::new(
            CardId::CTRL_Z,
            "Ctrl+Z",
            "Choose a tool from the discard pile and play it immediately.",
            ExecutionKind::DiscardRecall,
        ),
        CardDef::new(
            CardId::COLLABORATION,
            "Collaboration",
            "Choose one of your opponent's cards to reveal. Choose whether to use it for yourself \
             or force a discard. If the opposing player is out of cards, use the top card from the \
             remaining deck.",
            ExecutionKind::OpponentReveal,
        ),
        CardDef::new(
            CardId::MODEL_BUILDER,
            "Model Builder",
            "Choose a tool from the top 5 cards in the remaining deck. This tool will be played at \
             the end of the game.",
            ExecutionKind::DeckPreview,
        ),
        CardDef::new(
            CardId::DATA_VALIDATION,
            "Data Validation",
            "Choose three pieces from anywhere on the board to flip to your features. Chosen \
             spaces can be blank or occupied by your opponent's features.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0])
        .with_plays(3),
        CardDef::new(
            CardId::OPENING_MOVES,
            "Player's First Turn",
            "Add ten features anywhere on the board.",
            ExecutionKind::Placement,
        )
        .with_pattern(&[0])
        .with_plays(10),
    ]
}
