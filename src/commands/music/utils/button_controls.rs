use serenity::all::{ButtonStyle, CreateActionRow, CreateButton};

/// Custom id for the pick button of candidate `index` (0-based)
pub fn pick_button_id(prefix: u64, index: usize) -> String {
    format!("{}_pick_{}", prefix, index)
}

/// Parse a custom id produced by `pick_button_id` back into its index
pub fn parse_pick_button_id(prefix: u64, custom_id: &str) -> Option<usize> {
    custom_id
        .strip_prefix(&format!("{}_pick_", prefix))?
        .parse()
        .ok()
}

/// One numbered button per search candidate
pub fn create_pick_buttons(prefix: u64, count: usize) -> Vec<CreateActionRow> {
    let buttons = (0..count)
        .map(|index| {
            CreateButton::new(pick_button_id(prefix, index))
                .style(ButtonStyle::Primary)
                .label((index + 1).to_string())
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}
