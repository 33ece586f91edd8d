//! Word and part-of-speech statistics built on [`AvlTree`] and [`Queue`].
//!
//! A [`Lexicon`] maps each word to the tags it has been seen with, counting occurrences. Once
//! sorted, the tags of a word are ranked by decreasing frequency, and the first one is the best
//! guess for that word.

use core::{fmt, marker::PhantomPinned, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

use crate::{list, AvlTree, Error, Links, Queue, TreeNode, Weighted};

/// The tag guessed for a word the lexicon has never seen.
pub const UNKNOWN_TAG: &str = "UKN";

/// A part of speech associated with a word, and the number of times the pair was seen.
pub struct PartOfSpeech {
    links: list::Links<PartOfSpeech>,
    tag: String,
    occurrences: u32,
    _unpin: PhantomPinned,
}

impl PartOfSpeech {
    const INITIAL_OCCURRENCES: u32 = 1;

    /// Returns a new part of speech seen once.
    ///
    /// Fails with [`Error::InvalidArgument`] if `tag` is empty.
    pub fn new(tag: &str) -> Result<Box<PartOfSpeech>, Error> {
        if tag.is_empty() {
            return Err(Error::InvalidArgument);
        }

        Ok(Box::new(PartOfSpeech {
            links: list::Links::new(),
            tag: tag.to_owned(),
            occurrences: Self::INITIAL_OCCURRENCES,
            _unpin: PhantomPinned,
        }))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }

    fn add_occurrence(self: Pin<&mut Self>) {
        // SAFETY: Pinning is not structural for `occurrences`.
        let this = unsafe { self.get_unchecked_mut() };
        this.occurrences = this.occurrences.saturating_add(1);
    }
}

unsafe impl Linked<list::Links<PartOfSpeech>> for PartOfSpeech {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<list::Links<PartOfSpeech>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl Weighted for PartOfSpeech {
    type Weight = u32;

    fn weight(&self) -> u32 {
        self.occurrences
    }
}

impl fmt::Debug for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartOfSpeech")
            .field("tag", &self.tag)
            .field("occurrences", &self.occurrences)
            .finish()
    }
}

/// A word and the parts of speech it has been seen with.
pub struct Word {
    links: Links<Word>,
    name: String,
    tags: Queue<PartOfSpeech>,
    _unpin: PhantomPinned,
}

impl Word {
    /// Returns a new word with no parts of speech.
    ///
    /// Fails with [`Error::InvalidArgument`] if `name` is empty.
    pub fn new(name: &str) -> Result<Box<Word>, Error> {
        if name.is_empty() {
            return Err(Error::InvalidArgument);
        }

        Ok(Box::new(Word {
            links: Links::new(),
            name: name.to_owned(),
            tags: Queue::new(),
            _unpin: PhantomPinned,
        }))
    }

    fn with_tag(name: &str, tag: &str) -> Result<Box<Word>, Error> {
        let mut word = Word::new(name)?;
        word.tags.push(PartOfSpeech::new(tag)?);
        Ok(word)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records one more occurrence of this word tagged `tag`.
    ///
    /// Fails with [`Error::InvalidArgument`] if `tag` is empty.
    pub fn add_part_of_speech(self: Pin<&mut Self>, tag: &str) -> Result<(), Error> {
        if tag.is_empty() {
            return Err(Error::InvalidArgument);
        }

        // SAFETY: Pinning is not structural for `tags`.
        let tags = unsafe { &mut self.get_unchecked_mut().tags };

        let known = tags.iter_mut().find(|known| known.tag == tag);
        match known {
            Some(known) => known.add_occurrence(),
            None => tags.push(PartOfSpeech::new(tag)?),
        }

        Ok(())
    }

    /// Sorts the parts of speech by decreasing number of occurrences.
    pub fn sort(self: Pin<&mut Self>) {
        // SAFETY: Pinning is not structural for `tags`.
        unsafe { self.get_unchecked_mut().tags.sort() };
    }

    /// Returns the parts of speech of this word, in their current order.
    pub fn tags(&self) -> &Queue<PartOfSpeech> {
        &self.tags
    }

    /// Returns the first part of speech of this word, which is the most frequent one once the
    /// word is sorted.
    pub fn best(&self) -> Result<&PartOfSpeech, Error> {
        self.tags.peek().map(Pin::get_ref)
    }

    /// Returns the 1-based rank of `tag` among the parts of speech of this word.
    pub fn rank_of(&self, tag: &str) -> Option<usize> {
        self.tags
            .iter()
            .position(|pos| pos.tag == tag)
            .map(|idx| idx + 1)
    }
}

unsafe impl Linked<Links<Word>> for Word {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Word>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl TreeNode<Links<Word>> for Word {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.name
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Word")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// One tagged word of a sentence.
pub struct Entry {
    links: list::Links<Entry>,
    word: String,
    tag: String,
    _unpin: PhantomPinned,
}

impl Entry {
    /// Returns a new entry.
    ///
    /// Fails with [`Error::InvalidArgument`] if either `word` or `tag` is empty.
    pub fn new(word: &str, tag: &str) -> Result<Box<Entry>, Error> {
        if word.is_empty() || tag.is_empty() {
            return Err(Error::InvalidArgument);
        }

        Ok(Box::new(Entry {
            links: list::Links::new(),
            word: word.to_owned(),
            tag: tag.to_owned(),
            _unpin: PhantomPinned,
        }))
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

unsafe impl Linked<list::Links<Entry>> for Entry {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<list::Links<Entry>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

/// A sentence, as a queue of tagged words.
pub type Sentence = Queue<Entry>;

/// Word statistics learned from tagged sentences.
#[derive(Debug, Default)]
pub struct Lexicon {
    words: AvlTree<Word>,
}

impl Lexicon {
    /// Creates a new, empty `Lexicon`.
    pub const fn new() -> Self {
        Self {
            words: AvlTree::new(),
        }
    }

    /// Returns `true` if the lexicon contains no words.
    pub const fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the number of distinct words in the lexicon.
    pub const fn len(&self) -> usize {
        self.words.len()
    }

    /// Records one occurrence of `word` tagged `tag`.
    ///
    /// Fails with [`Error::InvalidArgument`] if either `word` or `tag` is empty.
    pub fn add(&mut self, word: &str, tag: &str) -> Result<(), Error> {
        let node = Word::with_tag(word, tag)?;

        match self.words.push(node) {
            Ok(()) => Ok(()),
            Err(exists) => exists.into_existing().add_part_of_speech(tag),
        }
    }

    /// Drains `sentence`, recording every entry.
    pub fn learn(&mut self, sentence: &mut Sentence) -> Result<(), Error> {
        while let Ok(entry) = sentence.pop() {
            self.add(entry.word(), entry.tag())?;
        }

        Ok(())
    }

    /// Sorts the parts of speech of every word by decreasing number of occurrences.
    pub fn sort(&mut self) {
        self.words.for_each_mut(Word::sort);
    }

    /// Returns the entry for `word`.
    pub fn find(&self, word: &str) -> Result<&Word, Error> {
        self.words.find(word).map(Pin::get_ref)
    }

    /// Returns the best tag for `word`, or [`UNKNOWN_TAG`] if the word was never seen.
    pub fn guess(&self, word: &str) -> &str {
        self.find(word)
            .and_then(Word::best)
            .map(PartOfSpeech::tag)
            .unwrap_or(UNKNOWN_TAG)
    }

    /// Returns an iterator over the words of the lexicon, in alphabetical order.
    pub fn words(&self) -> crate::Iter<'_, Word> {
        self.words.iter()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::prelude::v1::*;

    use super::*;

    fn tags_of(word: &Word) -> Vec<(&str, u32)> {
        word.tags()
            .iter()
            .map(|pos| (pos.tag(), pos.occurrences()))
            .collect()
    }

    #[test]
    fn empty_arguments() {
        let mut lexicon = Lexicon::new();

        assert_eq!(lexicon.add("", "NN"), Err(Error::InvalidArgument));
        assert_eq!(lexicon.add("dog", ""), Err(Error::InvalidArgument));
        assert!(lexicon.is_empty());

        assert!(Word::new("").is_err());
        assert!(PartOfSpeech::new("").is_err());
        assert!(Entry::new("dog", "").is_err());
    }

    #[test]
    fn repeated_tag_counts_in_place() {
        let mut word = Box::into_pin(Word::new("bank").unwrap());

        word.as_mut().add_part_of_speech("NN").unwrap();
        let first: *const PartOfSpeech = word.best().unwrap();

        word.as_mut().add_part_of_speech("NN").unwrap();
        assert_eq!(
            word.as_mut().add_part_of_speech(""),
            Err(Error::InvalidArgument)
        );

        assert_eq!(tags_of(&word), [("NN", 2)]);
        assert!(core::ptr::eq(word.best().unwrap(), first));
    }

    #[test]
    fn duplicates_merge_into_existing_word() {
        let mut lexicon = Lexicon::new();

        lexicon.add("run", "VB").unwrap();
        lexicon.add("run", "NN").unwrap();
        lexicon.add("run", "VB").unwrap();
        lexicon.add("dog", "NN").unwrap();

        assert_eq!(lexicon.len(), 2);
        let run = lexicon.find("run").unwrap();
        assert_eq!(tags_of(run), [("VB", 2), ("NN", 1)]);
    }

    #[test]
    fn sort_ranks_by_frequency() {
        let mut lexicon = Lexicon::new();

        for tag in ["NN", "VB", "VB", "JJ", "VB", "JJ"] {
            lexicon.add("fast", tag).unwrap();
        }

        lexicon.sort();

        let fast = lexicon.find("fast").unwrap();
        assert_eq!(tags_of(fast), [("VB", 3), ("JJ", 2), ("NN", 1)]);
        assert_eq!(fast.best().map(PartOfSpeech::tag), Ok("VB"));
        assert_eq!(fast.rank_of("JJ"), Some(2));
        assert_eq!(fast.rank_of("RB"), None);
    }

    #[test]
    fn guess() {
        let mut lexicon = Lexicon::new();

        lexicon.add("the", "DT").unwrap();
        lexicon.add("saw", "NN").unwrap();
        lexicon.add("saw", "VBD").unwrap();
        lexicon.add("saw", "VBD").unwrap();
        lexicon.sort();

        assert_eq!(lexicon.guess("the"), "DT");
        assert_eq!(lexicon.guess("saw"), "VBD");
        assert_eq!(lexicon.guess("zebra"), UNKNOWN_TAG);
    }

    #[test]
    fn learn_drains_sentences() {
        let mut sentence: Sentence = [("the", "DT"), ("cat", "NN"), ("sat", "VBD"), ("the", "DT")]
            .into_iter()
            .map(|(word, tag)| Entry::new(word, tag).unwrap())
            .collect();

        let mut lexicon = Lexicon::new();
        lexicon.learn(&mut sentence).unwrap();

        assert!(sentence.is_empty());
        assert_eq!(lexicon.len(), 3);

        let words: Vec<&str> = lexicon.words().map(Word::name).collect();
        assert_eq!(words, ["cat", "sat", "the"]);
        assert_eq!(tags_of(lexicon.find("the").unwrap()), [("DT", 2)]);
        lexicon.words.assert_invariants();
    }
}
