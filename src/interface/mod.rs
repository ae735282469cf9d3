pub mod prompts;
pub mod render;

pub use prompts::{
    parse_date, prompt_context, prompt_date, prompt_demographics, prompt_menu_items,
    prompt_text, prompt_yes_no,
};
pub use render::{
    display_averted_waste, display_batches, display_events, display_indent, display_menu,
};
