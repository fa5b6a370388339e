use newsdesk::document::{BlockDocument, BlockKind, BlockType, InlineMark, normalize};
use newsdesk::editor::{BlockCursor, EditAction, EditorSession};
use proptest::prelude::*;

/// One typed block: pick a type, type into it, optionally style it and add a
/// divider.
#[derive(Debug, Clone)]
struct Step {
    block_type: BlockType,
    text: String,
    toggle: bool,
    styling: Styling,
    divider: bool,
}

#[derive(Debug, Clone)]
enum Styling {
    None,
    /// Mark the whole block.
    Mark(InlineMark),
    /// Link the whole block.
    Link,
    /// Type `!` and a word after the text, then link only the word.
    LinkAfterBang,
}

fn styling() -> impl Strategy<Value = Styling> {
    prop_oneof![
        3 => Just(Styling::None),
        1 => prop_oneof![
            Just(InlineMark::Strong),
            Just(InlineMark::Emphasis),
            Just(InlineMark::Strikethrough),
        ]
        .prop_map(Styling::Mark),
        1 => Just(Styling::Link),
        1 => Just(Styling::LinkAfterBang),
    ]
}

fn text_block_type() -> impl Strategy<Value = BlockType> {
    prop_oneof![
        Just(BlockType::Paragraph),
        (1u8..=6).prop_map(BlockType::Heading),
        Just(BlockType::BulletListItem),
        Just(BlockType::NumberedListItem),
        Just(BlockType::CheckListItem),
        Just(BlockType::Quote),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    (
        text_block_type(),
        "[a-z][a-z0-9 *_#.>!\\[\\]|-]{0,12}",
        any::<bool>(),
        styling(),
        prop::bool::weighted(0.15),
    )
        .prop_map(|(block_type, text, toggle, styling, divider)| Step {
            block_type,
            text,
            toggle,
            styling,
            divider,
        })
}

fn style_block(session: &mut EditorSession, styling: &Styling) {
    let len = session.cursor().offset;
    match styling {
        Styling::None => {}
        Styling::Mark(mark) => {
            session
                .apply(EditAction::ToggleMark {
                    range: 0..len,
                    mark: *mark,
                })
                .unwrap();
        }
        Styling::Link => {
            session
                .apply(EditAction::SetLink {
                    range: 0..len,
                    url: Some("https://example.com/news".to_string()),
                })
                .unwrap();
        }
        Styling::LinkAfterBang => {
            session.apply(EditAction::InsertText("!site".into())).unwrap();
            session
                .apply(EditAction::SetLink {
                    range: len + 1..len + 5,
                    url: Some("/about".to_string()),
                })
                .unwrap();
        }
    }
}

fn run(steps: &[Step]) -> EditorSession {
    let mut session = EditorSession::open("");
    for (idx, step) in steps.iter().enumerate() {
        if idx > 0 {
            session.apply(EditAction::SplitBlock).unwrap();
        }
        session
            .apply(EditAction::SetBlockType(step.block_type.clone()))
            .unwrap();
        session.apply(EditAction::InsertText(step.text.clone())).unwrap();
        style_block(&mut session, &step.styling);
        if step.toggle && step.block_type == BlockType::CheckListItem {
            session.apply(EditAction::ToggleChecked).unwrap();
        }
        if step.divider {
            let after = Some(session.cursor().block);
            session
                .apply(EditAction::InsertBlock {
                    after,
                    kind: BlockKind::Divider,
                })
                .unwrap();
        }
    }
    session
}

fn code_or_image() -> impl Strategy<Value = BlockKind> {
    prop_oneof![
        (
            prop::option::of(Just("rust".to_string())),
            "[a-z][a-z ]{0,10}(\n[a-z ]{0,10}){0,3}",
        )
            .prop_map(|(language, code)| BlockKind::CodeBlock { language, code }),
        ("[a-z]{1,8}", "[a-z]{1,8}").prop_map(|(name, alt)| BlockKind::Image {
            url: format!("https://cdn.example.com/news-content/{name}.png"),
            alt,
        }),
        Just(BlockKind::Divider),
        "[a-z][a-z .]{0,16}".prop_map(|text| BlockKind::paragraph(&text)),
    ]
}

const NESTED: &str = "- one\n  - two\n    - three\n- four\n\n1. five\n   1. six\n   2. seven\n\n- [ ] eight\n  - [x] nine\n\nclosing words\n";

/// A structural edit addressed by block position, wrapped to the document.
#[derive(Debug, Clone)]
enum Reshape {
    Move { from: usize, to: usize },
    Delete(usize),
    Retype(usize, BlockType),
}

fn reshape() -> impl Strategy<Value = Reshape> {
    prop_oneof![
        (0usize..32, 0usize..32).prop_map(|(from, to)| Reshape::Move { from, to }),
        (0usize..32).prop_map(Reshape::Delete),
        (0usize..32, text_block_type()).prop_map(|(at, block_type)| Reshape::Retype(at, block_type)),
    ]
}

fn reshape_nested(edits: &[Reshape]) -> EditorSession {
    let mut session = EditorSession::open(NESTED);
    for edit in edits {
        let ids: Vec<_> = session.document().blocks().iter().map(|block| block.id).collect();
        let len = ids.len();
        let id_at = |idx: usize| ids[idx % len];
        let action = match edit {
            Reshape::Move { from, to } => EditAction::MoveBlock {
                block: id_at(*from),
                to: to % len,
            },
            Reshape::Delete(at) => EditAction::DeleteBlock(id_at(*at)),
            Reshape::Retype(at, block_type) => {
                let block = id_at(*at);
                session
                    .apply(EditAction::SetCursor(BlockCursor::new(block, 0)))
                    .unwrap();
                EditAction::SetBlockType(block_type.clone())
            }
        };
        session.apply(action).unwrap();
    }
    session
}

proptest! {
    #[test]
    fn test_reshaped_nested_lists_round_trip(edits in prop::collection::vec(reshape(), 1..8)) {
        let session = reshape_nested(&edits);
        let doc = session.document();
        let mut previous: Option<u8> = None;
        for kind in doc.kinds().filter(|kind| !kind.is_blank_paragraph()) {
            let depth = kind.list_depth();
            if let Some(depth) = depth {
                prop_assert!(depth <= previous.map_or(0, |above| above + 1), "orphan item in {:?}", session.markdown());
            }
            previous = depth;
        }
        let reparsed = BlockDocument::from_markdown(session.markdown());
        prop_assert!(
            reparsed.equivalent(doc),
            "markdown {:?} reparsed as {:?}",
            session.markdown(),
            reparsed.kinds().collect::<Vec<_>>()
        );
        let once = normalize(session.markdown());
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_edited_documents_survive_markdown_round_trip(steps in prop::collection::vec(step(), 1..10)) {
        let session = run(&steps);
        let reparsed = BlockDocument::from_markdown(session.markdown());
        prop_assert!(
            reparsed.equivalent(session.document()),
            "markdown {:?} reparsed as {:?}",
            session.markdown(),
            reparsed.kinds().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_normalize_reaches_fixed_point(steps in prop::collection::vec(step(), 1..10)) {
        let session = run(&steps);
        let once = normalize(session.markdown());
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_code_and_image_blocks_round_trip(kinds in prop::collection::vec(code_or_image(), 1..6)) {
        let doc = BlockDocument::from_kinds(kinds);
        let markdown = doc.to_markdown();
        let reparsed = BlockDocument::from_markdown(&markdown);
        prop_assert!(reparsed.equivalent(&doc), "markdown {:?}", markdown);
    }
}

#[test]
fn test_markdown_tracks_every_edit() {
    let mut session = EditorSession::open("");
    session
        .apply(EditAction::SetBlockType(BlockType::Heading(2)))
        .unwrap();
    assert_eq!(session.apply(EditAction::InsertText("Notice".into())).unwrap(), "## Notice\n");
    session.apply(EditAction::SplitBlock).unwrap();
    session.apply(EditAction::InsertText("Body text".into())).unwrap();
    assert_eq!(session.markdown(), "## Notice\n\nBody text\n");
    session.apply(EditAction::DeleteBackward).unwrap();
    assert_eq!(session.markdown(), "## Notice\n\nBody tex\n");
}

#[test]
fn test_fixture_article_is_stable_after_one_normalization() {
    let source = include_str!("fixtures/article.md");
    let once = normalize(source);
    assert_eq!(normalize(&once), once, "canonical markdown must be a fixed point");
    assert!(
        BlockDocument::from_markdown(&once).equivalent(&BlockDocument::from_markdown(source)),
        "normalizing must not change the article"
    );
}
