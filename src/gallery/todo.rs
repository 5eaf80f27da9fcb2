//! Todo list with filtering and editing.

use crate::core::Mapping;
use crate::effects::{Effect, EffectQueue};
use serde::{Deserialize, Serialize};

pub type ItemId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: ItemId,
    pub text: String,
    pub is_completed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    All,
    Active,
    Completed,
}

impl DisplayMode {
    pub fn accepts(&self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.is_completed,
            Self::Completed => item.is_completed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoInput {
    UpdateNewText(String),
    CreateTodo,
    UpdateText(ItemId, String),
    ToggleCompleted(ItemId),
    UpdateDisplayMode(DisplayMode),
    ToggleEdit,
    /// Remove the items at these positions of the full list.
    Delete(Vec<usize>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    items: Vec<TodoItem>,
    pub new_text: String,
    pub display_mode: DisplayMode,
    pub is_editing: bool,
    next_item_id: ItemId,
}

impl Default for TodoState {
    fn default() -> Self {
        let item = |id, text: &str, is_completed| TodoItem {
            id,
            text: text.to_string(),
            is_completed,
        };
        Self {
            items: vec![
                item(-1, "Buy apples", false),
                item(-2, "Run 5 km", false),
                item(-3, "Learn Harvest", true),
            ],
            new_text: String::new(),
            display_mode: DisplayMode::All,
            is_editing: false,
            next_item_id: 1,
        }
    }
}

impl TodoState {
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Items passing the current display mode.
    pub fn visible_items(&self) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|item| self.display_mode.accepts(item))
            .collect()
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }
}

/// Every input is handled, even when it changes nothing.
pub fn mapping<Q, Id, W>() -> Mapping<TodoInput, TodoState, Q, Id, W>
where
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    Mapping::inout(|input, state: &mut TodoState| {
        match input {
            TodoInput::UpdateNewText(text) => state.new_text = text.clone(),
            TodoInput::CreateTodo => {
                if !state.new_text.is_empty() {
                    let text = std::mem::take(&mut state.new_text);
                    state.items.push(TodoItem {
                        id: state.next_item_id,
                        text,
                        is_completed: false,
                    });
                    state.next_item_id += 1;
                }
            }
            TodoInput::UpdateText(id, text) => {
                if let Some(item) = state.item_mut(*id) {
                    item.text = text.clone();
                }
            }
            TodoInput::ToggleCompleted(id) => {
                if let Some(item) = state.item_mut(*id) {
                    item.is_completed = !item.is_completed;
                }
            }
            TodoInput::UpdateDisplayMode(mode) => state.display_mode = *mode,
            TodoInput::ToggleEdit => state.is_editing = !state.is_editing,
            TodoInput::Delete(offsets) => {
                let mut offsets = offsets.clone();
                offsets.sort_unstable();
                offsets.dedup();
                for offset in offsets.into_iter().rev() {
                    if offset < state.items.len() {
                        state.items.remove(offset);
                    }
                }
            }
        }
        Some(Effect::empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::BasicEffectQueue;

    fn run(state: TodoState, inputs: Vec<TodoInput>) -> TodoState {
        let mapping = mapping::<BasicEffectQueue, (), ()>();
        inputs.into_iter().fold(state, |state, input| {
            mapping.run(&input, &state).map(|(s, _)| s).unwrap_or(state)
        })
    }

    #[test]
    fn create_appends_and_clears_text() {
        let state = run(
            TodoState::default(),
            vec![
                TodoInput::UpdateNewText("Write tests".into()),
                TodoInput::CreateTodo,
            ],
        );

        let last = state.items().last().unwrap();
        assert_eq!(last.id, 1);
        assert_eq!(last.text, "Write tests");
        assert!(state.new_text.is_empty());
    }

    #[test]
    fn create_without_text_changes_nothing() {
        let state = run(TodoState::default(), vec![TodoInput::CreateTodo]);
        assert_eq!(state, TodoState::default());
    }

    #[test]
    fn display_mode_filters_visible_items() {
        let state = run(
            TodoState::default(),
            vec![
                TodoInput::ToggleCompleted(-1),
                TodoInput::UpdateDisplayMode(DisplayMode::Completed),
            ],
        );

        let visible: Vec<ItemId> = state.visible_items().iter().map(|i| i.id).collect();
        assert_eq!(visible, vec![-1, -3]);
    }

    #[test]
    fn delete_removes_offsets_and_ignores_out_of_range() {
        let state = run(
            TodoState::default(),
            vec![TodoInput::Delete(vec![2, 0, 9])],
        );

        let ids: Vec<ItemId> = state.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![-2]);
    }

    #[test]
    fn update_text_targets_item_by_id() {
        let state = run(
            TodoState::default(),
            vec![TodoInput::UpdateText(-2, "Run 10 km".into()), TodoInput::ToggleEdit],
        );

        assert_eq!(state.items()[1].text, "Run 10 km");
        assert!(state.is_editing);
    }
}
