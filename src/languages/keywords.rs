//! Keyword lists of the builtin languages.
//!
//! Each list is made of comma separated groups so languages can share the common ones.

const FLOW_CONTROL: &str = "break,continue,do,else,for,if,return,while";

const C: &str = "auto,case,char,const,default,double,enum,extern,float,goto,inline,int,long,\
    register,restrict,short,signed,sizeof,static,struct,switch,typedef,union,unsigned,void,\
    volatile";

const COMMON: &str = "catch,class,delete,false,import,new,operator,private,protected,public,\
    this,throw,true,try,typeof";

const CPP: &str = "alignas,alignof,align_union,asm,axiom,bool,concept,concept_map,const_cast,\
    constexpr,decltype,delegate,dynamic_cast,explicit,export,friend,generic,late_check,mutable,\
    namespace,noexcept,noreturn,nullptr,property,reinterpret_cast,static_assert,static_cast,\
    template,typeid,typename,using,virtual,where";

const JAVA: &str = "abstract,assert,boolean,byte,extends,finally,final,implements,import,\
    instanceof,interface,null,native,package,strictfp,super,synchronized,throws,transient";

const CSHARP: &str = "abstract,add,alias,as,ascending,async,await,base,bool,by,byte,checked,\
    decimal,delegate,descending,dynamic,event,finally,fixed,foreach,from,get,global,group,\
    implicit,in,interface,internal,into,is,join,let,lock,null,object,out,override,orderby,\
    params,partial,readonly,ref,remove,sbyte,sealed,select,set,stackalloc,string,select,uint,\
    ulong,unchecked,unsafe,ushort,value,var,virtual,where,yield";

const JSCRIPT: &str = "abstract,async,await,constructor,debugger,enum,eval,export,function,get,\
    implements,instanceof,interface,let,null,set,undefined,var,with,yield,Infinity,NaN";

const PYTHON: &str = "and,as,assert,class,def,del,elif,except,exec,finally,from,global,import,\
    in,is,lambda,nonlocal,not,or,pass,print,raise,try,with,yield,False,True,None";

const RUBY: &str = "alias,and,begin,case,class,def,defined,elsif,end,ensure,false,in,module,\
    next,nil,not,or,redo,rescue,retry,self,super,then,true,undef,unless,until,when,yield,\
    BEGIN,END";

const SH: &str = "case,done,elif,esac,eval,fi,function,in,local,set,then,until";

const COFFEE: &str = "all,and,by,catch,class,else,extends,false,finally,for,if,in,is,isnt,\
    loop,new,no,not,null,of,off,on,or,return,super,then,throw,true,try,unless,until,when,while,yes";

const PERL: &str = "caller,delete,die,do,dump,elsif,eval,exit,foreach,for,goto,if,import,\
    last,local,my,next,no,our,print,package,redo,require,sub,undef,unless,until,use,wantarray,while,BEGIN,END";

pub(crate) const COFFEE_KEYWORDS: &[&str] = &[COFFEE];
pub(crate) const PERL_KEYWORDS: &[&str] = &[PERL];
pub(crate) const CPP_KEYWORDS: &[&str] = &[FLOW_CONTROL, C, COMMON, CPP];
pub(crate) const JAVA_KEYWORDS: &[&str] = &[FLOW_CONTROL, C, COMMON, JAVA];
pub(crate) const CSHARP_KEYWORDS: &[&str] = &[FLOW_CONTROL, C, COMMON, CSHARP];
pub(crate) const JSCRIPT_KEYWORDS: &[&str] = &[FLOW_CONTROL, C, COMMON, JSCRIPT];
pub(crate) const PYTHON_KEYWORDS: &[&str] = &[FLOW_CONTROL, PYTHON];
pub(crate) const RUBY_KEYWORDS: &[&str] = &[FLOW_CONTROL, RUBY];
pub(crate) const SH_KEYWORDS: &[&str] = &[FLOW_CONTROL, SH];
pub(crate) const JSON_KEYWORDS: &[&str] = &["null,true,false"];

/// What the default code lexer highlights: every keyword of every builtin language
pub(crate) const ALL_KEYWORDS: &[&str] = &[
    FLOW_CONTROL,
    C,
    COMMON,
    CPP,
    CSHARP,
    JAVA,
    JSCRIPT,
    PERL,
    PYTHON,
    RUBY,
    SH,
];

/// Splits comma or whitespace separated groups into single keywords, without duplicates
pub(crate) fn split_keywords(groups: &[&str]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in groups
        .iter()
        .flat_map(|group| group.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|k| !k.is_empty())
    {
        if !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_owned());
        }
    }
    keywords
}
